//! Macros for declaring state and event enumerations.

/// Generate `State` trait implementation for simple enums.
///
/// Each variant's identifier defaults to its name; `=> "id"` overrides it.
/// The enum derives serde's `Serialize` and `Deserialize`, so the calling
/// crate must depend on `serde`.
///
/// # Example
///
/// ```
/// use statelane::core::State;
/// use statelane::state_enum;
///
/// state_enum! {
///     pub enum Power {
///         Off => "off",
///         On => "on",
///         Standby,
///     }
/// }
///
/// assert_eq!(Power::Off.id(), "off");
/// assert_eq!(Power::Standby.id(), "Standby");
/// ```
#[macro_export]
macro_rules! state_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident $(=> $id:literal)?
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, serde::Serialize, serde::Deserialize)]
        $vis enum $name {
            $(
                $(#[$variant_meta])*
                $variant
            ),*
        }

        impl $crate::core::State for $name {
            fn id(&self) -> &str {
                match self {
                    $(Self::$variant => $crate::__variant_id!($variant $(, $id)?)),*
                }
            }
        }
    };
}

/// Generate `Event` trait implementation for data-less enums.
///
/// # Example
///
/// ```
/// use statelane::core::Event;
/// use statelane::event_enum;
///
/// event_enum! {
///     pub enum Input {
///         Press => "press",
///         Release => "release",
///     }
/// }
///
/// assert_eq!(Input::Press.id(), "press");
/// ```
#[macro_export]
macro_rules! event_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident $(=> $id:literal)?
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
        $vis enum $name {
            $(
                $(#[$variant_meta])*
                $variant
            ),*
        }

        impl $crate::core::Event for $name {
            fn id(&self) -> &str {
                match self {
                    $(Self::$variant => $crate::__variant_id!($variant $(, $id)?)),*
                }
            }
        }
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __variant_id {
    ($variant:ident) => {
        stringify!($variant)
    };
    ($variant:ident, $id:literal) => {
        $id
    };
}

#[cfg(test)]
mod tests {
    use crate::core::{Event, State};

    state_enum! {
        enum TestState {
            Initial => "initial",
            Processing,
            Complete => "complete",
        }
    }

    event_enum! {
        enum TestEvent {
            Start => "start",
            Finish,
        }
    }

    #[test]
    fn state_enum_macro_generates_trait() {
        assert_eq!(TestState::Initial.id(), "initial");
        assert_eq!(TestState::Processing.id(), "Processing");
        assert_eq!(TestState::Complete.id(), "complete");
    }

    #[test]
    fn event_enum_macro_generates_trait() {
        assert_eq!(TestEvent::Start.id(), "start");
        assert_eq!(TestEvent::Finish.id(), "Finish");
    }

    #[test]
    fn state_enum_supports_visibility() {
        state_enum! {
            pub enum PublicState {
                A,
                B,
            }
        }

        assert_eq!(PublicState::A.id(), "A");
        assert_ne!(PublicState::A, PublicState::B);
    }

    #[test]
    fn state_enum_serializes_by_variant_name() {
        let json = serde_json::to_string(&TestState::Initial).unwrap();
        assert_eq!(json, "\"Initial\"");
    }
}
