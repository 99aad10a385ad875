//! Settings negotiation: validating and merging owner-submitted patches.

use chitpass_protocol::{RoomSettings, SettingsPatch};

use crate::GameError;

/// Maximum length of a display name or entity name, in characters.
pub const MAX_NAME_LEN: usize = 20;

/// Minimum number of entity names a room must keep configured.
pub const MIN_ENTITIES: usize = 2;

/// Maximum number of entity names a room may configure.
pub const MAX_ENTITIES: usize = 10;

/// Bounds `max_players` is clamped into.
pub const MIN_PLAYERS: usize = 2;
pub const MAX_PLAYERS: usize = 8;

/// Merges a partial settings update into `settings`.
///
/// Validation happens before anything is written, so a rejected patch
/// leaves every field untouched:
///
/// - `entity_names` are trimmed, emptied-out entries dropped, each name
///   capped at [`MAX_NAME_LEN`] chars, the list capped at
///   [`MAX_ENTITIES`]; fewer than [`MIN_ENTITIES`] survivors reject the
///   whole call.
/// - `max_players` is clamped into `MIN_PLAYERS..=MAX_PLAYERS` rather
///   than rejected.
/// - `room_name` and `pass_mode` are taken as-is.
pub(crate) fn apply_patch(
    settings: &mut RoomSettings,
    patch: SettingsPatch,
) -> Result<(), GameError> {
    let entity_names = match patch.entity_names {
        Some(names) => {
            let cleaned = sanitize_entity_names(&names);
            if cleaned.len() < MIN_ENTITIES {
                return Err(GameError::Validation(format!(
                    "need at least {MIN_ENTITIES} entity names"
                )));
            }
            Some(cleaned)
        }
        None => None,
    };

    if let Some(names) = entity_names {
        settings.entity_names = names;
    }
    if let Some(name) = patch.room_name {
        settings.room_name = name;
    }
    if let Some(max) = patch.max_players {
        settings.max_players = max.clamp(MIN_PLAYERS, MAX_PLAYERS);
    }
    if let Some(mode) = patch.pass_mode {
        settings.pass_mode = mode;
    }
    Ok(())
}

fn sanitize_entity_names(names: &[String]) -> Vec<String> {
    names
        .iter()
        .map(|n| n.trim().chars().take(MAX_NAME_LEN).collect::<String>())
        .filter(|n| !n.is_empty())
        .take(MAX_ENTITIES)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chitpass_protocol::PassMode;

    fn patch() -> SettingsPatch {
        SettingsPatch::default()
    }

    #[test]
    fn test_apply_patch_merges_accepted_fields() {
        let mut settings = RoomSettings::default();
        apply_patch(
            &mut settings,
            SettingsPatch {
                room_name: Some("Den".into()),
                max_players: Some(6),
                entity_names: Some(vec!["Lion".into(), "Tiger".into()]),
                pass_mode: Some(PassMode::Auto),
            },
        )
        .expect("valid patch should apply");

        assert_eq!(settings.room_name, "Den");
        assert_eq!(settings.max_players, 6);
        assert_eq!(settings.entity_names, vec!["Lion", "Tiger"]);
        assert_eq!(settings.pass_mode, PassMode::Auto);
    }

    #[test]
    fn test_apply_patch_absent_fields_leave_values_untouched() {
        let mut settings = RoomSettings::default();
        let before = settings.clone();

        apply_patch(&mut settings, patch()).expect("empty patch is valid");

        assert_eq!(settings, before);
    }

    #[test]
    fn test_entity_names_are_trimmed_and_empties_dropped() {
        let mut settings = RoomSettings::default();
        apply_patch(
            &mut settings,
            SettingsPatch {
                entity_names: Some(vec![
                    "  Lion ".into(),
                    "".into(),
                    "   ".into(),
                    "Tiger".into(),
                ]),
                ..patch()
            },
        )
        .unwrap();

        assert_eq!(settings.entity_names, vec!["Lion", "Tiger"]);
    }

    #[test]
    fn test_entity_names_capped_at_ten() {
        let mut settings = RoomSettings::default();
        let names: Vec<String> =
            (0..15).map(|i| format!("Animal{i}")).collect();
        apply_patch(
            &mut settings,
            SettingsPatch { entity_names: Some(names), ..patch() },
        )
        .unwrap();

        assert_eq!(settings.entity_names.len(), MAX_ENTITIES);
    }

    #[test]
    fn test_long_entity_names_are_truncated() {
        let mut settings = RoomSettings::default();
        apply_patch(
            &mut settings,
            SettingsPatch {
                entity_names: Some(vec![
                    "A".repeat(40),
                    "Tiger".into(),
                ]),
                ..patch()
            },
        )
        .unwrap();

        assert_eq!(settings.entity_names[0].chars().count(), MAX_NAME_LEN);
    }

    #[test]
    fn test_too_few_entity_names_rejects_whole_patch() {
        let mut settings = RoomSettings::default();
        let before = settings.clone();

        let result = apply_patch(
            &mut settings,
            SettingsPatch {
                // Room name rides along but must NOT be applied when the
                // entity list fails validation.
                room_name: Some("Den".into()),
                entity_names: Some(vec!["Lion".into(), "   ".into()]),
                ..patch()
            },
        );

        assert!(matches!(result, Err(GameError::Validation(_))));
        assert_eq!(settings, before, "failed patch must not mutate anything");
    }

    #[test]
    fn test_max_players_clamped_not_rejected() {
        let mut settings = RoomSettings::default();

        apply_patch(
            &mut settings,
            SettingsPatch { max_players: Some(1), ..patch() },
        )
        .unwrap();
        assert_eq!(settings.max_players, MIN_PLAYERS);

        apply_patch(
            &mut settings,
            SettingsPatch { max_players: Some(99), ..patch() },
        )
        .unwrap();
        assert_eq!(settings.max_players, MAX_PLAYERS);
    }
}
