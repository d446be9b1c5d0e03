//! `define_port_error!`: declares a port error enum plus one snake_case
//! constructor per variant.
//!
//! Struct-variant constructors take `impl Into<T>` for each field, so
//! `Query { message: String }` can be built with `Error::query("boom")`.

macro_rules! define_port_error {
    (
        $(#[$outer:meta])*
        pub enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident $( { $($field:ident : $ty:ty),* $(,)? } )? => $message:expr
            ),* $(,)?
        }
    ) => {
        $(#[$outer])*
        #[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
        pub enum $name {
            $(
                $(#[$variant_meta])*
                #[error($message)]
                $variant $( { $($field : $ty),* } )?,
            )*
        }

        impl $name {
            $(
                define_port_error!(@ctor $variant $( { $($field : $ty),* } )?);
            )*
        }
    };

    (@ctor $variant:ident) => {
        ::paste::paste! {
            #[allow(missing_docs)]
            pub fn [<$variant:snake>]() -> Self {
                Self::$variant
            }
        }
    };

    (@ctor $variant:ident { $($field:ident : $ty:ty),* $(,)? }) => {
        define_port_error!(@fields $variant () () $( $field : $ty, )*);
    };

    (@fields $variant:ident ($($params:tt)*) ($($inits:tt)*) ) => {
        ::paste::paste! {
            #[allow(missing_docs)]
            pub fn [<$variant:snake>]($($params)*) -> Self {
                Self::$variant { $($inits)* }
            }
        }
    };

    (@fields $variant:ident ($($params:tt)*) ($($inits:tt)*) $field:ident : $ty:ty, $($rest:tt)*) => {
        define_port_error!(
            @fields
            $variant
            ($($params)* $field: impl Into<$ty>,)
            ($($inits)* $field: $field.into(),)
            $($rest)*
        );
    };
}

pub(crate) use define_port_error;

#[cfg(test)]
mod tests {
    use crate::domain::NotebookId;

    define_port_error! {
        pub enum SamplePortError {
            Offline => "store offline",
            Query { message: String } => "query failed: {message}",
            Stale { expected: u32, actual: u32 } => "stale: {expected} != {actual}",
            Gone { notebook_id: NotebookId, message: String } => "{notebook_id} gone: {message}",
        }
    }

    #[test]
    fn unit_variant_gets_a_nullary_constructor() {
        assert_eq!(SamplePortError::offline(), SamplePortError::Offline);
    }

    #[test]
    fn string_fields_accept_str() {
        assert_eq!(SamplePortError::query("boom").to_string(), "query failed: boom");
    }

    #[test]
    fn numeric_fields_keep_their_type() {
        assert_eq!(SamplePortError::stale(1_u32, 2_u32).to_string(), "stale: 1 != 2");
    }

    #[test]
    fn domain_ids_and_strings_mix() {
        let id = NotebookId::random();
        let err = SamplePortError::gone(id, "deleted");
        assert_eq!(err.to_string(), format!("{id} gone: deleted"));
    }
}
