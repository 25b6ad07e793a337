/// A message that travels over a topic.
///
/// Payloads are snapshots: consumers never call back into the producer to
/// complete them. `event_type` and `version` identify the payload schema in
/// logs and let consumers reject shapes they do not understand.
pub trait Event: Clone + core::fmt::Debug + Send + Sync + 'static {
    /// Stable dotted name, e.g. `catalog.resource.snapshot`.
    fn event_type(&self) -> &'static str;

    fn version(&self) -> u32;

    /// `event_type` and `version` as one label (`catalog.resource.snapshot@v1`).
    fn schema(&self) -> String {
        format!("{}@v{}", self.event_type(), self.version())
    }
}
