use serror::Serror;

/// Plain-text rendering of a [Serror], suitable for log lines and
/// progress-event messages. There is no UI layer in this crate, so
/// unlike upstream formatting helpers this never emits markup.
pub fn format_serror(Serror { error, trace }: &Serror) -> String {
  let trace = if !trace.is_empty() {
    let mut out = "\n\ntrace:".to_string();
    for (i, msg) in trace.iter().enumerate() {
      out.push_str(&format!("\n\t{}: {msg}", i + 1));
    }
    out
  } else {
    Default::default()
  };
  format!("error: {error}{trace}")
}
