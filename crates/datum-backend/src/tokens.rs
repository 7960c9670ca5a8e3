use uuid::Uuid;

/// Source of fresh tokens.
pub trait TokenGenerator: Send + Sync {
    fn new_token(&self) -> String;
}

/// Random v4 UUIDs in hyphenated form.
#[derive(Clone, Copy, Debug, Default)]
pub struct UuidTokenGenerator;

impl TokenGenerator for UuidTokenGenerator {
    fn new_token(&self) -> String {
        Uuid::new_v4().to_string()
    }
}

impl<F> TokenGenerator for F
where
    F: Fn() -> String + Send + Sync,
{
    fn new_token(&self) -> String {
        self()
    }
}
