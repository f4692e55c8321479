//! Convenience macros for plugin libraries.

/// Exports the manifest symbol the dynamic loader looks for.
///
/// Place once at the root of a plugin library built as a `cdylib`. Every
/// listed type must implement [`Plugin`](crate::registry::Plugin) and
/// `Default`.
///
/// # Example
/// ```rust,ignore
/// modhost_plugin::export_plugins!(GrubFinder, ChargeTweaks);
/// ```
#[macro_export]
macro_rules! export_plugins {
    ($($ty:ty),+ $(,)?) => {
        #[unsafe(no_mangle)]
        pub fn modhost_plugin_exports() -> ::std::vec::Vec<$crate::discovery::ExportedType> {
            ::std::vec![$($crate::discovery::ExportedType::plugin::<$ty>()),+]
        }
    };
}
