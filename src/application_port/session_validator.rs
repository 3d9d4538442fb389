use crate::domain_model::SubjectId;

pub trait SessionValidator: Send + Sync {
    /// Name of the request header carrying `<scheme> <token>`.
    fn header_name(&self) -> &str;

    /// `None` means the request proceeds anonymously. This is not an error.
    fn derive_subject(&self, header_value: Option<&str>) -> Option<SubjectId>;
}
