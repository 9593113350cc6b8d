use crate::db::DatabaseError;
use serde::{Deserialize, Serialize};

/// Macro to generate enum with as_str + std::str::FromStr pattern.
/// The string form is also the serde wire form. Extra `| "alias"`
/// literals are accepted on input but never written.
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal $(| $alias:literal)*),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $s $(, alias = $alias)*)] $variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = DatabaseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s $(| $alias)* => Ok(Self::$variant)),+,
                    _ => Err(DatabaseError::InvalidEnum {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
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

str_enum!(MoodLabel {
    Happy => "happy",
    Sad => "sad",
    Stressed => "stressed",
    Motivated => "motivated",
    Neutral => "neutral",
});

impl Default for MoodLabel {
    fn default() -> Self {
        Self::Neutral
    }
}

str_enum!(MessageAuthor {
    User => "user",
    Assistant => "assistant",
});

// English labels come from clients that tag replies in English.
str_enum!(Tone {
    Carinoso => "cariñoso" | "caring",
    Empatico => "empático" | "empathetic",
    Motivacional => "motivacional" | "motivational",
    Energico => "enérgico" | "energetic",
    Alegre => "alegre" | "cheerful",
    Sereno => "sereno" | "calm",
    Solidario => "solidario" | "supportive",
    Informativo => "informativo" | "informative",
});

str_enum!(TimeOfDay {
    Morning => "morning",
    Afternoon => "afternoon",
    Evening => "evening",
    Night => "night",
});

impl TimeOfDay {
    /// Bucket a local hour (0-23): 5-11 morning, 12-17 afternoon,
    /// 18-21 evening, anything else night.
    pub fn from_hour(hour: u32) -> Self {
        match hour {
            5..=11 => Self::Morning,
            12..=17 => Self::Afternoon,
            18..=21 => Self::Evening,
            _ => Self::Night,
        }
    }

    pub fn now() -> Self {
        use chrono::Timelike;
        Self::from_hour(chrono::Local::now().hour())
    }
}

str_enum!(FormType {
    Contact => "contact",
    Quote => "quote",
    Demo => "demo",
});
