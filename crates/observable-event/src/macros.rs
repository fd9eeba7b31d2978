//! Macros for reducing event boilerplate.

/// Build an `EVENT_TYPE` key from the current module path and a type name.
///
/// The key has the form `my_crate::auth::Login`, unique as long as type names
/// are unique within a module.
///
/// # Example
///
/// ```ignore
/// use observable_event::{async_trait, event_type, ObservableEvent};
///
/// #[derive(Debug, Clone)]
/// struct Login {
///     username: String,
///     pwd: String,
/// }
///
/// #[async_trait]
/// impl ObservableEvent for Login {
///     const EVENT_TYPE: &'static str = event_type!(Login);  // "my_crate::Login"
///     type Output = String;
///
///     async fn processing(&self) -> anyhow::Result<String> {
///         Ok("success".into())
///     }
/// }
/// ```
#[macro_export]
macro_rules! event_type {
    ($ty:ident) => {
        concat!(module_path!(), "::", stringify!($ty))
    };
}
