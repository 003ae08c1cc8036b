//! Declaration macro for node kinds.

/// Declare a node kind: a struct whose fields are the kind's attributes,
/// plus its [`AttrSchema`](crate::layer::AttrSchema) implementation.
///
/// Each field is given with its external attribute name (which may contain
/// dots, e.g. `"coref.rf"`). `refs` lists the attributes that hold node
/// ids; nested references inside a map attribute are written as paths
/// (`"a/lex.rf"`). An optional `state` block adds fields that are not
/// attributes (bookkeeping kept only in memory).
///
/// # Example
///
/// ```ignore
/// node_kind! {
///     /// A named-entity node.
///     pub struct NNode {
///         "ne_type" => ne_type: Option<String>,
///         "a.rf" => a_rf: Vec<String>,
///     }
///     refs = ["a.rf"];
/// }
/// ```
macro_rules! node_kind {
    (
        $(#[$meta:meta])*
        pub struct $name:ident {
            $(
                $(#[$fmeta:meta])*
                $attr:literal => $field:ident : $ty:ty,
            )*
        }
        refs = [$($ref_attr:literal),* $(,)?];
        $(
            state {
                $(
                    $(#[$smeta:meta])*
                    $sfield:ident : $sty:ty,
                )*
            }
        )?
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq)]
        pub struct $name {
            $(
                $(#[$fmeta])*
                pub $field: $ty,
            )*
            $($(
                $(#[$smeta])*
                pub $sfield: $sty,
            )*)?
        }

        impl $crate::layer::AttrSchema for $name {
            const ATTRS: &'static [(&'static str, $crate::attr::AttrType)] = &[
                $(($attr, <$ty as $crate::attr::AttrField>::TYPE),)*
            ];

            const REF_ATTRS: &'static [&'static str] = &[$($ref_attr),*];

            fn get_attr(&self, name: &str) -> Option<$crate::attr::AttrValue> {
                match name {
                    $($attr => $crate::attr::AttrField::to_attr(&self.$field),)*
                    _ => None,
                }
            }

            fn set_attr(
                &mut self,
                name: &str,
                value: Option<$crate::attr::AttrValue>,
            ) -> $crate::error::TreeResult<bool> {
                match name {
                    $(
                        $attr => {
                            self.$field = $crate::attr::AttrField::from_attr(name, value)?;
                            Ok(true)
                        }
                    )*
                    _ => Ok(false),
                }
            }
        }
    };
}
