//! Terminal rendering of the canvas and notices

use colored::Colorize;
use netmap_canvas::CanvasSnapshot;
use netmap_core::{Notice, NoticeLevel};
use netmap_model::{BorderStyle, ElementId, NodeData};
use std::fmt::Write;

/// Render nodes grouped by kind, then connections by endpoint name
pub fn format_canvas(snapshot: &CanvasSnapshot) -> String {
    let mut out = String::new();

    let devices: Vec<_> = snapshot
        .nodes
        .iter()
        .filter_map(|n| n.data.as_device().map(|d| (n, d)))
        .collect();
    let groups: Vec<_> = snapshot
        .nodes
        .iter()
        .filter_map(|n| n.data.as_group().map(|g| (n, g)))
        .collect();

    let _ = writeln!(out, "{} ({})", "Devices".bold(), devices.len());
    for (node, device) in &devices {
        let _ = writeln!(
            out,
            "  {}  {}  {}  {}{}",
            node.id.to_string().dimmed(),
            device.name.bright_cyan(),
            device.ip_address,
            device.device_type.display_name(),
            sync_marker(node.synced),
        );
        if !device.notes.is_empty() {
            let _ = writeln!(out, "      {}", device.notes.italic());
        }
    }

    let _ = writeln!(out, "{} ({})", "Groups".bold(), groups.len());
    for (node, group) in &groups {
        let _ = writeln!(
            out,
            "  {}  {}  {}{}",
            node.id.to_string().dimmed(),
            group.name.bright_cyan(),
            border_label(&group.border_style()),
            sync_marker(node.synced),
        );
    }

    let _ = writeln!(out, "{} ({})", "Connections".bold(), snapshot.edges.len());
    for edge in &snapshot.edges {
        let _ = writeln!(
            out,
            "  {}  {} <-> {}{}",
            edge.id.to_string().dimmed(),
            node_label(snapshot, &edge.source),
            node_label(snapshot, &edge.target),
            sync_marker(edge.synced),
        );
    }

    if snapshot.flags.connecting {
        let _ = writeln!(out, "{}", "Connection mode on".yellow());
    }
    out
}

fn border_label(style: &BorderStyle) -> String {
    match style {
        BorderStyle::Css(color) => format!("border {}", color),
        BorderStyle::Class(class) => class.clone(),
    }
}

fn node_label(snapshot: &CanvasSnapshot, id: &ElementId) -> String {
    match snapshot.node(id).map(|n| &n.data) {
        Some(NodeData::Device(d)) => d.name.clone(),
        Some(NodeData::Group(g)) => g.name.clone(),
        None => id.to_string(),
    }
}

fn sync_marker(synced: bool) -> String {
    if synced {
        String::new()
    } else {
        format!("  {}", "(unsaved)".yellow())
    }
}

/// One line per notice, colored by level
pub fn format_notices(notices: &[Notice]) -> String {
    notices
        .iter()
        .map(|notice| {
            let text = match notice.level {
                NoticeLevel::Info => notice.text.normal(),
                NoticeLevel::Success => notice.text.green(),
                NoticeLevel::Warning => notice.text.yellow(),
                NoticeLevel::Error => notice.text.red(),
            };
            format!("{} {}\n", level_badge(notice.level), text)
        })
        .collect()
}

fn level_badge(level: NoticeLevel) -> colored::ColoredString {
    match level {
        NoticeLevel::Info => "[info]".blue(),
        NoticeLevel::Success => "[ok]".green().bold(),
        NoticeLevel::Warning => "[warn]".yellow().bold(),
        NoticeLevel::Error => "[error]".red().bold(),
    }
}

/// Device-group mappings as `device -> group` lines
pub fn format_mappings(snapshot: &CanvasSnapshot, mappings: &[(ElementId, ElementId)]) -> String {
    let mut out = format!("{} ({})\n", "Mappings".bold(), mappings.len());
    for (device, group) in mappings {
        let _ = writeln!(
            out,
            "  {} -> {}",
            node_label(snapshot, device),
            node_label(snapshot, group)
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use netmap_core::{DeviceType, Position};
    use netmap_model::{CanvasEdge, CanvasNode, DeviceData, GroupData};

    fn id(raw: &str) -> ElementId {
        ElementId::parse(raw).unwrap()
    }

    fn snapshot() -> CanvasSnapshot {
        let a = CanvasNode::device(
            id("device-1"),
            Position::zero(),
            DeviceData::new("Router", "192.168.1.1", DeviceType::Router),
        )
        .synced();
        let b = CanvasNode::device(
            id("device-2"),
            Position::zero(),
            DeviceData::new("NAS", "192.168.1.50", DeviceType::Server).with_notes("backups"),
        );
        let g = CanvasNode::group(id("group-1"), Position::zero(), GroupData::new("Office"));
        CanvasSnapshot {
            nodes: vec![a, b, g],
            edges: vec![CanvasEdge::new(id("edge-1"), id("device-1"), id("device-2")).synced()],
            ..Default::default()
        }
    }

    #[test]
    fn test_format_canvas() {
        colored::control::set_override(false);
        let text = format_canvas(&snapshot());
        assert!(text.contains("Devices (2)"));
        assert!(text.contains("device-1  Router  192.168.1.1  Router"));
        assert!(text.contains("device-2  NAS  192.168.1.50  Server  (unsaved)"));
        assert!(text.contains("backups"));
        assert!(text.contains("Groups (1)"));
        assert!(text.contains("group-1  Office  border-blue-400  (unsaved)"));
        assert!(text.contains("edge-1  Router <-> NAS"));
    }

    #[test]
    fn test_group_border_labels() {
        assert_eq!(
            border_label(&GroupData::new("a").with_color("#4361ee").border_style()),
            "border #4361ee"
        );
        assert_eq!(
            border_label(&GroupData::new("a").with_color("green-500").border_style()),
            "border-green-500"
        );
    }

    #[test]
    fn test_format_notices() {
        colored::control::set_override(false);
        let notices = vec![
            Notice::new(NoticeLevel::Success, "Added NAS"),
            Notice::new(NoticeLevel::Error, "Failed to load network data"),
        ];
        assert_eq!(
            format_notices(&notices),
            "[ok] Added NAS\n[error] Failed to load network data\n"
        );
    }

    #[test]
    fn test_format_mappings_uses_names() {
        colored::control::set_override(false);
        let text = format_mappings(&snapshot(), &[(id("device-1"), id("group-1"))]);
        assert!(text.contains("Router -> Office"));
    }
}
