//! `define_port_error!`: error enums for driven ports.
//!
//! Each variant gets a `thiserror` message and a snake_case constructor.
//! Constructor parameters take `impl Into<T>`, so adapters can pass `&str`
//! for `String` fields:
//!
//! ```ignore
//! define_port_error! {
//!     pub enum ClubRepositoryError {
//!         Connection { message: String } => "club store connection failed: {message}",
//!         RevisionMismatch { expected: u32, actual: u32 } =>
//!             "club revision {actual} does not match expected {expected}",
//!     }
//! }
//!
//! let err = ClubRepositoryError::connection("pool timed out");
//! ```

macro_rules! define_port_error {
    // Unit variant.
    (@constructor $variant:ident) => {
        ::paste::paste! {
            pub fn [<$variant:snake>]() -> Self {
                Self::$variant
            }
        }
    };

    // Struct variant: fold the fields into parameter and initialiser lists.
    (@constructor $variant:ident { $($field:ident : $ty:ty),* $(,)? }) => {
        define_port_error!(@fields $variant [] [] $( $field : $ty, )*);
    };

    (@fields $variant:ident [$($params:tt)*] [$($inits:tt)*]) => {
        ::paste::paste! {
            pub fn [<$variant:snake>]($($params)*) -> Self {
                Self::$variant { $($inits)* }
            }
        }
    };

    (@fields $variant:ident [$($params:tt)*] [$($inits:tt)*] $field:ident : $ty:ty, $($rest:tt)*) => {
        define_port_error!(
            @fields $variant
            [$($params)* $field: impl Into<$ty>,]
            [$($inits)* $field: $field.into(),]
            $($rest)*
        );
    };

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
                define_port_error!(@constructor $variant $( { $($field : $ty),* } )?);
            )*
        }
    };
}

pub(crate) use define_port_error;

#[cfg(test)]
mod tests {
    define_port_error! {
        pub enum LedgerError {
            Offline => "ledger offline",
            Missing { name: String } => "no ledger named {name}",
            Stale { expected: u32, actual: u32 } => "ledger revision {actual}, expected {expected}",
        }
    }

    #[test]
    fn unit_variants_get_nullary_constructors() {
        assert_eq!(LedgerError::offline(), LedgerError::Offline);
        assert_eq!(LedgerError::offline().to_string(), "ledger offline");
    }

    #[test]
    fn string_fields_accept_borrowed_text() {
        let err = LedgerError::missing("treasury");
        assert_eq!(err.to_string(), "no ledger named treasury");
    }

    #[test]
    fn numeric_fields_keep_their_type() {
        let err = LedgerError::stale(3_u32, 4_u32);
        assert_eq!(
            err,
            LedgerError::Stale {
                expected: 3,
                actual: 4
            }
        );
        assert_eq!(err.to_string(), "ledger revision 4, expected 3");
    }
}
