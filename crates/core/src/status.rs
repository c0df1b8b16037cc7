//! Status enums mapping to SMALLINT lookup tables.
//!
//! Each variant's discriminant matches the seed data order (1-based) in the
//! corresponding `*_statuses` table. On the wire a status is its
//! SCREAMING_SNAKE_CASE name; parsing is case-insensitive.

use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

/// Status ID type matching SMALLINT in the database.
pub type StatusId = i16;

macro_rules! define_status_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident = $val:literal => $label:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[repr(i16)]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        pub enum $name {
            $( $(#[$vmeta])* #[serde(rename = $label)] $variant = $val ),+
        }

        impl $name {
            /// Every variant in seed order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Return the database status ID.
            pub fn id(self) -> StatusId {
                self as StatusId
            }

            /// Look up a variant by its database status ID.
            pub fn from_id(id: StatusId) -> Option<Self> {
                match id {
                    $( $val => Some($name::$variant), )+
                    _ => None,
                }
            }

            /// The wire name, e.g. `IN_PROGRESS`.
            pub fn name(self) -> &'static str {
                match self {
                    $( $name::$variant => $label, )+
                }
            }
        }

        impl From<$name> for StatusId {
            fn from(value: $name) -> Self {
                value as StatusId
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.name())
            }
        }

        impl FromStr for $name {
            type Err = CoreError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let wanted = s.trim();
                $name::ALL
                    .iter()
                    .copied()
                    .find(|status| status.name().eq_ignore_ascii_case(wanted))
                    .ok_or_else(|| {
                        CoreError::InvalidInput(format!(
                            "Unknown {} '{}'; expected one of {}",
                            stringify!($name),
                            wanted,
                            $name::ALL
                                .iter()
                                .map(|s| s.name())
                                .collect::<Vec<_>>()
                                .join(", "),
                        ))
                    })
            }
        }
    };
}

define_status_enum! {
    /// Project lifecycle status.
    ProjectStatus {
        Created = 1 => "CREATED",
        InProgress = 2 => "IN_PROGRESS",
        Completed = 3 => "COMPLETED",
        Late = 4 => "LATE",
    }
}

define_status_enum! {
    /// Task lifecycle status.
    TaskStatus {
        Pending = 1 => "PENDING",
        InProgress = 2 => "IN_PROGRESS",
        Completed = 3 => "COMPLETED",
        Late = 4 => "LATE",
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn project_status_ids_match_seed_data() {
        assert_eq!(ProjectStatus::Created.id(), 1);
        assert_eq!(ProjectStatus::InProgress.id(), 2);
        assert_eq!(ProjectStatus::Completed.id(), 3);
        assert_eq!(ProjectStatus::Late.id(), 4);
    }

    #[test]
    fn task_status_round_trips_through_id() {
        for status in TaskStatus::ALL {
            assert_eq!(TaskStatus::from_id(status.id()), Some(*status));
        }
        assert_eq!(TaskStatus::from_id(9), None);
    }

    #[test]
    fn status_into_status_id() {
        let id: StatusId = TaskStatus::Late.into();
        assert_eq!(id, 4);
    }

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!("in_progress".parse::<ProjectStatus>().unwrap(), ProjectStatus::InProgress);
        assert_eq!(" Late ".parse::<TaskStatus>().unwrap(), TaskStatus::Late);
    }

    #[test]
    fn parse_unknown_status_is_invalid_input() {
        assert_matches!("ARCHIVED".parse::<ProjectStatus>(), Err(CoreError::InvalidInput(_)));
        assert_matches!("".parse::<TaskStatus>(), Err(CoreError::InvalidInput(_)));
    }

    #[test]
    fn serializes_as_wire_name() {
        let json = serde_json::to_string(&TaskStatus::InProgress).unwrap();
        assert_eq!(json, "\"IN_PROGRESS\"");
        let parsed: ProjectStatus = serde_json::from_str("\"COMPLETED\"").unwrap();
        assert_eq!(parsed, ProjectStatus::Completed);
    }
}
