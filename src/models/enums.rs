use serde::{Deserialize, Serialize};

/// Macro to generate enum with as_str + Display pattern.
/// The string form is also the serde wire form; variant attributes
/// (e.g. `#[default]`) pass through.
macro_rules! str_enum {
    ($name:ident { $($(#[$vmeta:meta])* $variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
        pub enum $name {
            $($(#[$vmeta])* #[serde(rename = $s)] $variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

str_enum!(RunStatus {
    // Patients with no ledger entry have never been run.
    #[default]
    NotRun => "NOT_RUN",
    InFlow => "IN_FLOW",
    Completed => "COMPLETED",
});
