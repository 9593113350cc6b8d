//! Fixed reply templates and placeholder interpolation.
//!
//! Placeholders are `{name}` and `{greeting}`. Anything else in braces is
//! left untouched.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use super::types::AdviceTopic;
use crate::models::enums::{MoodLabel, TimeOfDay, Tone};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Template {
    pub text: &'static str,
    pub tone: Tone,
}

const fn t(text: &'static str, tone: Tone) -> Template {
    Template { text, tone }
}

// ═══════════════════════════════════════════
// Ordinary turns, keyed by mood
// ═══════════════════════════════════════════

const PERSONAL_HAPPY: &[Template] = &[
    t(
        "¡Qué alegría leerte así, {name}! Esa energía se contagia. ¿Qué es lo que más te ha hecho sonreír hoy?",
        Tone::Alegre,
    ),
    t(
        "Me encanta verte tan bien, {name}. Disfruta este momento y guárdalo para los días difíciles.",
        Tone::Carinoso,
    ),
];

const PERSONAL_SAD: &[Template] = &[
    t(
        "Siento mucho que estés pasando por esto, {name}. Está bien no estar bien; aquí estoy para escucharte.",
        Tone::Empatico,
    ),
    t(
        "{name}, lo que sientes es válido. Un paso pequeño hoy ya es un gran avance. ¿Quieres contarme qué pasó?",
        Tone::Carinoso,
    ),
];

const PERSONAL_STRESSED: &[Template] = &[
    t(
        "Respira conmigo, {name}: inhala en cuatro tiempos, sostén cuatro y exhala en cuatro. No tienes que resolverlo todo hoy.",
        Tone::Empatico,
    ),
    t(
        "{name}, noto que llevas mucho encima. Divide lo pendiente en tareas pequeñas y empieza solo por una. Yo te acompaño.",
        Tone::Empatico,
    ),
];

const PERSONAL_MOTIVATED: &[Template] = &[
    t(
        "¡Esa es la actitud, {name}! Convierte esa energía en una meta concreta para hoy.",
        Tone::Motivacional,
    ),
    t(
        "¡Vamos con todo, {name}! Nada detiene a alguien con tu determinación.",
        Tone::Energico,
    ),
];

const PERSONAL_NEUTRAL: &[Template] = &[
    t(
        "Gracias por compartirlo conmigo, {name}. ¿Cómo te gustaría que te acompañe hoy?",
        Tone::Carinoso,
    ),
    t(
        "Aquí estoy para ti, {name}. Cuéntame un poco más sobre cómo te sientes.",
        Tone::Sereno,
    ),
];

/// Candidates for an ordinary turn.
pub fn personal_candidates(mood: MoodLabel) -> &'static [Template] {
    match mood {
        MoodLabel::Happy => PERSONAL_HAPPY,
        MoodLabel::Sad => PERSONAL_SAD,
        MoodLabel::Stressed => PERSONAL_STRESSED,
        MoodLabel::Motivated => PERSONAL_MOTIVATED,
        MoodLabel::Neutral => PERSONAL_NEUTRAL,
    }
}

// ═══════════════════════════════════════════
// Welcome, keyed by the conversation's last mood
// ═══════════════════════════════════════════

const WELCOME_NEUTRAL: &[Template] = &[
    t(
        "¡{greeting}, {name}! Soy tu asistente de bienestar. ¿Cómo te sientes hoy?",
        Tone::Carinoso,
    ),
    t(
        "{greeting}, {name}. Este es tu espacio seguro; cuéntame cómo va tu día.",
        Tone::Sereno,
    ),
];

const WELCOME_SAD: &[Template] = &[t(
    "{greeting}, {name}. La última vez te noté con el ánimo bajo. ¿Cómo sigues?",
    Tone::Empatico,
)];

const WELCOME_STRESSED: &[Template] = &[t(
    "{greeting}, {name}. Antes de empezar, tómate un respiro. ¿Cómo va esa carga de hoy?",
    Tone::Empatico,
)];

/// Candidates for a greeting. Moods without a dedicated list use neutral.
pub fn welcome_candidates(mood: MoodLabel) -> &'static [Template] {
    match mood {
        MoodLabel::Sad => WELCOME_SAD,
        MoodLabel::Stressed => WELCOME_STRESSED,
        _ => WELCOME_NEUTRAL,
    }
}

pub fn greeting(time_of_day: TimeOfDay) -> &'static str {
    match time_of_day {
        TimeOfDay::Morning => "Buenos días",
        TimeOfDay::Afternoon => "Buenas tardes",
        TimeOfDay::Evening => "Buenas noches",
        TimeOfDay::Night => "Hola, ave nocturna",
    }
}

// ═══════════════════════════════════════════
// Mood-independent intents
// ═══════════════════════════════════════════

pub const AFFIRMATIONS: [Template; 6] = [
    t("{name}, eres más fuerte de lo que crees.", Tone::Motivacional),
    t("Mereces cosas buenas, {name}, y hoy es un buen día para recordarlo.", Tone::Carinoso),
    t("Cada pequeño avance cuenta, {name}. Sigue adelante.", Tone::Motivacional),
    t("{name}, tu esfuerzo de hoy es la base de tus logros de mañana.", Tone::Energico),
    t("Está bien ir a tu propio ritmo, {name}.", Tone::Sereno),
    t("{name}, confía en el proceso y en ti.", Tone::Carinoso),
];

const ADVICE_MOTIVATION: Template = t(
    "{name}, elige una meta pequeña y alcanzable para hoy. Cumplirla alimenta la motivación para la siguiente.",
    Tone::Motivacional,
);

const ADVICE_STRESS: Template = t(
    "{name}, prueba la técnica 4-7-8: inhala cuatro segundos, sostén siete y exhala ocho. Repite tres veces y haz una pausa lejos de las pantallas.",
    Tone::Empatico,
);

const ADVICE_CONFIDENCE: Template = t(
    "{name}, escribe tres cosas que hiciste bien esta semana. Tu confianza crece cuando reconoces tus propios logros.",
    Tone::Carinoso,
);

const ADVICE_WORK: Template = t(
    "{name}, organiza tu jornada en bloques de 25 minutos con descansos cortos y empieza por la tarea más importante.",
    Tone::Motivacional,
);

/// Generic encouragement for unknown topics and empty candidate lists.
pub const ENCOURAGEMENT: Template = t(
    "{name}, estoy aquí para apoyarte. Un paso a la vez es suficiente.",
    Tone::Carinoso,
);

pub const EMERGENCY: Template = t(
    "{name}, lo que sientes importa y no estás solo. Si estás en peligro, llama ahora a tu número local de emergencias (911) o a una línea de crisis. También puedes hablar con alguien de confianza; no tienes que pasar por esto sin ayuda.",
    Tone::Solidario,
);

/// Shown once per failed save, next to the already-rendered turn.
pub const PERSISTENCE_NOTICE: Template = t(
    "No pude guardar nuestra conversación en este momento, {name}. Si lo necesitas, también puedes escribirnos por el formulario de contacto o por correo.",
    Tone::Informativo,
);

pub fn advice_template(topic: Option<AdviceTopic>) -> &'static Template {
    match topic {
        Some(AdviceTopic::Motivation) => &ADVICE_MOTIVATION,
        Some(AdviceTopic::Stress) => &ADVICE_STRESS,
        Some(AdviceTopic::Confidence) => &ADVICE_CONFIDENCE,
        Some(AdviceTopic::Work) => &ADVICE_WORK,
        None => &ENCOURAGEMENT,
    }
}

// ═══════════════════════════════════════════
// Interpolation
// ═══════════════════════════════════════════

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{(\w+)\}").expect("Invalid placeholder regex"));

/// Plain substitution of `{name}` and `{greeting}`.
pub fn interpolate(text: &str, name: &str, greeting: &str) -> String {
    PLACEHOLDER
        .replace_all(text, |caps: &Captures| match &caps[1] {
            "name" => name.to_string(),
            "greeting" => greeting.to_string(),
            _ => caps[0].to_string(),
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_MOODS: [MoodLabel; 5] = [
        MoodLabel::Happy,
        MoodLabel::Sad,
        MoodLabel::Stressed,
        MoodLabel::Motivated,
        MoodLabel::Neutral,
    ];

    #[test]
    fn every_mood_has_one_or_two_candidates() {
        for mood in ALL_MOODS {
            let personal = personal_candidates(mood);
            assert!((1..=2).contains(&personal.len()), "{mood}");
            let welcome = welcome_candidates(mood);
            assert!((1..=2).contains(&welcome.len()), "{mood}");
        }
    }

    #[test]
    fn welcome_falls_back_to_neutral() {
        assert_eq!(welcome_candidates(MoodLabel::Happy), WELCOME_NEUTRAL);
        assert_eq!(welcome_candidates(MoodLabel::Motivated), WELCOME_NEUTRAL);
    }

    #[test]
    fn welcome_templates_carry_greeting() {
        for mood in ALL_MOODS {
            for tpl in welcome_candidates(mood) {
                assert!(tpl.text.contains("{greeting}"));
                assert!(tpl.text.contains("{name}"));
            }
        }
    }

    #[test]
    fn stressed_candidates_are_empathetic() {
        assert!(personal_candidates(MoodLabel::Stressed)
            .iter()
            .all(|tpl| tpl.tone == Tone::Empatico));
    }

    #[test]
    fn interpolate_replaces_known_placeholders() {
        let out = interpolate("{greeting}, {name}! {name}?", "Ana", "Buenos días");
        assert_eq!(out, "Buenos días, Ana! Ana?");
    }

    #[test]
    fn interpolate_leaves_unknown_placeholders() {
        assert_eq!(interpolate("Hola {apodo}", "Ana", "x"), "Hola {apodo}");
    }

    #[test]
    fn interpolate_does_not_reexpand_inserted_text() {
        assert_eq!(interpolate("Hola {name}", "{greeting}", "x"), "Hola {greeting}");
    }

    #[test]
    fn unknown_topic_gets_encouragement() {
        assert_eq!(advice_template(None), &ENCOURAGEMENT);
        assert_eq!(advice_template(Some(AdviceTopic::Stress)).tone, Tone::Empatico);
    }

    #[test]
    fn greeting_table_is_complete() {
        for tod in [
            TimeOfDay::Morning,
            TimeOfDay::Afternoon,
            TimeOfDay::Evening,
            TimeOfDay::Night,
        ] {
            assert!(!greeting(tod).is_empty());
        }
    }
}
