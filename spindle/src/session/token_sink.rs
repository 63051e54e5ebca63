/// Receives the text of every generated token.
///
/// Returning `false` stops generation right after the current token; no
/// further decode is issued. There is no other way to interrupt a run, so
/// timeouts and user interrupts are expressed through this return value.
pub trait TokenSink {
    fn on_token(
        &mut self,
        text: &str,
    ) -> bool;
}

impl<F> TokenSink for F
where
    F: FnMut(&str) -> bool,
{
    fn on_token(
        &mut self,
        text: &str,
    ) -> bool {
        self(text)
    }
}
