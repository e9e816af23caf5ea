//! Macros generating the error enums returned by driven ports.
//!
//! `define_port_error!` turns a list of variants and display messages into a
//! `thiserror` enum with one snake-case constructor per variant; string
//! fields accept anything `Into<String>`.
//!
//! `define_repository_error!` builds on it for repository ports. Every store
//! fails the same two ways, so it adds `Connection` and `Query` variants
//! labelled with the repository name ahead of any port-specific variants.
//! Services map those two uniformly to `service_unavailable` and `internal`.

macro_rules! define_port_error {
    (@ctor $variant:ident) => {
        ::paste::paste! {
            #[doc = "Construct the `" $variant "` variant."]
            pub fn [<$variant:snake>]() -> Self {
                Self::$variant
            }
        }
    };

    (@ctor $variant:ident { $($field:ident : $ty:ty),* $(,)? }) => {
        $crate::domain::ports::define_port_error!(@fields $variant [] [] $( $field : $ty, )*);
    };

    (@fields $variant:ident [$($params:tt)*] [$($inits:tt)*]) => {
        ::paste::paste! {
            #[doc = "Construct the `" $variant "` variant."]
            pub fn [<$variant:snake>]($($params)*) -> Self {
                Self::$variant { $($inits)* }
            }
        }
    };

    (@fields $variant:ident [$($params:tt)*] [$($inits:tt)*] $field:ident : $ty:ty, $($rest:tt)*) => {
        $crate::domain::ports::define_port_error!(
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
                $variant:ident $( { $($field:ident : $ty:ty),* $(,)? } )? => $message:literal
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
                $crate::domain::ports::define_port_error!(@ctor $variant $( { $($field : $ty),* } )?);
            )*
        }
    };
}

macro_rules! define_repository_error {
    (
        $(#[$outer:meta])*
        pub enum $name:ident ($store:literal) {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident $( { $($field:ident : $ty:ty),* $(,)? } )? => $message:literal
            ),* $(,)?
        }
    ) => {
        $(#[$outer])*
        #[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
        pub enum $name {
            /// The store could not be reached.
            #[error("{store} connection failed: {message}", store = $store)]
            Connection { message: String },
            /// A statement failed after the store was reached.
            #[error("{store} query failed: {message}", store = $store)]
            Query { message: String },
            $(
                $(#[$variant_meta])*
                #[error($message)]
                $variant $( { $($field : $ty),* } )?,
            )*
        }

        impl $name {
            $crate::domain::ports::define_port_error!(@ctor Connection { message: String });
            $crate::domain::ports::define_port_error!(@ctor Query { message: String });
            $(
                $crate::domain::ports::define_port_error!(@ctor $variant $( { $($field : $ty),* } )?);
            )*
        }
    };
}

pub(crate) use define_port_error;
pub(crate) use define_repository_error;
