use uuid::Uuid;

/// Per-request context, inserted by the tracing middleware.
///
/// Immutable for the lifetime of the request.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct RequestContext {
    request_id: Uuid,
}

impl RequestContext {
    pub fn new(request_id: Uuid) -> Self {
        Self { request_id }
    }

    /// Fresh context with a time-ordered (v7) request id.
    pub fn generate() -> Self {
        Self::new(Uuid::now_v7())
    }

    pub fn request_id(&self) -> Uuid {
        self.request_id
    }
}
