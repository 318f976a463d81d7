//! Plain-text rendering of a team for sharing outside the app.

use std::fmt::Write;

use crate::types::{capitalize, Team};
use crate::MAX_TEAM_SIZE;

/// Renders a team as a short numbered list.
///
/// ```text
/// My Pokemon Team: Rain Team
///
/// 1. Squirtle (Water)
/// 2. Pelipper (Water/Flying)
///
/// (2/6 Pokemon)
/// ```
///
/// The size footer is omitted for a full team. Output has no trailing
/// newline.
pub fn format_team_for_sharing(team: &Team) -> String {
    let mut out = String::new();
    // Writing to a String cannot fail.
    let _ = writeln!(out, "My Pokemon Team: {}", team.name);
    out.push('\n');

    for (index, member) in team.members.iter().enumerate() {
        let types = member
            .types
            .iter()
            .map(|t| capitalize(t))
            .collect::<Vec<_>>()
            .join("/");
        let _ = writeln!(out, "{}. {} ({})", index + 1, capitalize(&member.name), types);
    }

    if team.size() < MAX_TEAM_SIZE {
        out.push('\n');
        let _ = writeln!(out, "({}/{} Pokemon)", team.size(), MAX_TEAM_SIZE);
    }

    out.trim().to_string()
}
