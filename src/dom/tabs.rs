use super::Document;

/// Activate the tab and panel matching `target` and deactivate all others.
///
/// Operates on whatever elements the document holds. An unknown target
/// leaves nothing active.
pub fn select_tab(doc: &mut Document, target: &str) {
    for tab in &mut doc.tabs {
        tab.active = tab.target == target;
    }
    for panel in &mut doc.panels {
        panel.active = panel.id == target;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{Panel, Tab};

    fn doc(ids: &[&str]) -> Document {
        Document {
            tabs: ids
                .iter()
                .map(|id| Tab {
                    target: id.to_string(),
                    label: id.to_string(),
                    active: false,
                })
                .collect(),
            panels: ids
                .iter()
                .map(|id| Panel {
                    id: id.to_string(),
                    active: false,
                })
                .collect(),
            forms: Vec::new(),
        }
    }

    #[test]
    fn exactly_one_tab_and_panel_active() {
        let ids = ["metrics", "analysis", "live", "config"];
        let mut doc = doc(&ids);
        for target in ids {
            select_tab(&mut doc, target);
            let tabs: Vec<_> = doc.tabs.iter().filter(|t| t.active).collect();
            let panels: Vec<_> = doc.panels.iter().filter(|p| p.active).collect();
            assert_eq!(tabs.len(), 1);
            assert_eq!(panels.len(), 1);
            assert_eq!(tabs[0].target, target);
            assert_eq!(panels[0].id, target);
        }
    }

    #[test]
    fn unknown_target_deactivates_everything() {
        let mut doc = doc(&["metrics", "live"]);
        select_tab(&mut doc, "metrics");
        select_tab(&mut doc, "nope");
        assert!(doc.tabs.iter().all(|t| !t.active));
        assert!(doc.panels.iter().all(|p| !p.active));
        assert_eq!(doc.active_panel(), None);
    }
}
