//! Helper macro for declaring port error enums.
//!
//! Every variant gets a snake_case constructor whose parameters accept
//! `impl Into<T>`, so adapters can write `TulipClientError::transport(err.to_string())`
//! or `ObjectStoreError::rejected("read-only")` without spelling out the fields.

macro_rules! define_port_error {
    (@ctor $variant:ident) => {
        ::paste::paste! {
            #[doc = concat!("Build a [`Self::", stringify!($variant), "`] error.")]
            pub fn [<$variant:snake>]() -> Self {
                Self::$variant
            }
        }
    };

    (@ctor $variant:ident { $($field:ident : $ty:ty),* $(,)? }) => {
        define_port_error!(@ctor_impl $variant () () $( $field : $ty, )*);
    };

    (@ctor_impl $variant:ident ($($params:tt)*) ($($inits:tt)*) ) => {
        ::paste::paste! {
            #[doc = concat!("Build a [`Self::", stringify!($variant), "`] error.")]
            pub fn [<$variant:snake>]($($params)*) -> Self {
                Self::$variant { $($inits)* }
            }
        }
    };

    (@ctor_impl $variant:ident ($($params:tt)*) ($($inits:tt)*) $field:ident : $ty:ty, $($rest:tt)*) => {
        define_port_error!(
            @ctor_impl
            $variant
            ($($params)* $field: impl Into<$ty>,)
            ($($inits)* $field: $field.into(),)
            $($rest)*
        );
    };

    (
        $(#[$outer:meta])*
        pub enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident $( { $($(#[$field_meta:meta])* $field:ident : $ty:ty),* $(,)? } )? => $message:expr
            ),* $(,)?
        }
    ) => {
        $(#[$outer])*
        #[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
        pub enum $name {
            $(
                $(#[$variant_meta])*
                #[error($message)]
                $variant $( { $($(#[$field_meta])* $field : $ty),* } )?,
            )*
        }

        impl $name {
            $(
                define_port_error!(@ctor $variant $( { $($field : $ty),* } )?);
            )*
        }
    };
}

pub(crate) use define_port_error;

#[cfg(test)]
mod tests {
    //! Constructor and message coverage for generated port errors.

    define_port_error! {
        /// Errors used only to exercise the macro.
        pub enum SamplePortError {
            /// No fields.
            Closed => "port closed",
            /// One string field.
            Rejected {
                /// Reason text.
                message: String,
            } => "rejected: {message}",
            /// Mixed field types.
            Coded {
                /// Numeric code.
                code: u32,
                /// Reason text.
                message: String,
            } => "code {code}: {message}",
        }
    }

    #[test]
    fn unit_variants_get_constructors() {
        assert_eq!(SamplePortError::closed(), SamplePortError::Closed);
        assert_eq!(SamplePortError::closed().to_string(), "port closed");
    }

    #[test]
    fn string_fields_accept_str() {
        let err = SamplePortError::rejected("read-only store");
        assert_eq!(err.to_string(), "rejected: read-only store");
    }

    #[test]
    fn mixed_fields_keep_their_types() {
        let err = SamplePortError::coded(1001_u32, "not authorized");
        assert_eq!(
            err,
            SamplePortError::Coded {
                code: 1001,
                message: "not authorized".to_owned(),
            }
        );
        assert_eq!(err.to_string(), "code 1001: not authorized");
    }
}
