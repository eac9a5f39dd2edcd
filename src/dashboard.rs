//! Dashboard controller: owns the document, the panel views and the API
//! client, and routes user events to the panel handlers.

use tracing::{debug, info};

use crate::dom::layout::{
    self, ANALYSIS_FORM, ANALYSIS_PANEL, CONFIG_FORM, CONFIG_REFRESH, LIVE_FORM, LIVE_PANEL,
    METRICS_FORM, METRICS_PANEL,
};
use crate::dom::tabs::select_tab;
use crate::dom::{Document, Form};
use crate::http::{ApiClient, Transport};
use crate::panels::config::{self, ConfigView, StatusLine};
use crate::panels::{self, PanelView, analysis, live, metrics};
use crate::settings::schema::PanelSettings;

/// A user interaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// Initial page load.
    PageLoad,
    /// A tab was clicked; carries the tab's target panel id.
    TabClick(String),
    /// A form was submitted; carries the form id.
    Submit(String),
    /// A button outside a submit action was clicked; carries the button id.
    Click(String),
}

pub struct Dashboard<T> {
    document: Document,
    metrics: PanelView,
    analysis: PanelView,
    live: PanelView,
    config: ConfigView,
    client: ApiClient<T>,
}

impl<T: Transport> Dashboard<T> {
    pub fn new(client: ApiClient<T>, panels: &PanelSettings) -> Self {
        Self {
            document: layout::dashboard(panels),
            metrics: PanelView::default(),
            analysis: PanelView::default(),
            live: PanelView::default(),
            config: ConfigView::default(),
            client,
        }
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn client(&self) -> &ApiClient<T> {
        &self.client
    }

    /// Mutable access to a form, for entering field values before a submit.
    pub fn form_mut(&mut self, id: &str) -> Option<&mut Form> {
        self.document.form_mut(id)
    }

    /// View of a request panel by panel id.
    pub fn view(&self, panel: &str) -> Option<&PanelView> {
        match panel {
            METRICS_PANEL => Some(&self.metrics),
            ANALYSIS_PANEL => Some(&self.analysis),
            LIVE_PANEL => Some(&self.live),
            _ => None,
        }
    }

    /// Rendered output text of a request panel (empty for unknown panels).
    pub fn output_text(&self, panel: &str) -> String {
        self.view(panel)
            .map(|view| panels::render(view.state()))
            .unwrap_or_default()
    }

    pub fn config_status(&self) -> &StatusLine {
        self.config.status()
    }

    /// Handle one event. Unknown form or button ids are ignored.
    pub fn dispatch(&mut self, event: Event) {
        debug!(?event, "dispatching event");
        match event {
            Event::PageLoad => self.load_config(),
            Event::TabClick(target) => select_tab(&mut self.document, &target),
            Event::Submit(form_id) => self.submit(&form_id),
            Event::Click(button) if button == CONFIG_REFRESH => self.load_config(),
            Event::Click(button) => debug!(%button, "click on unbound element"),
        }
    }

    fn submit(&mut self, form_id: &str) {
        let Some(form) = self.document.form_mut(form_id) else {
            debug!(%form_id, "submit for unknown form");
            return;
        };
        info!(%form_id, "form submitted");
        match form_id {
            METRICS_FORM => metrics::submit(form, &mut self.metrics, &self.client),
            ANALYSIS_FORM => analysis::submit(form, &mut self.analysis, &self.client),
            LIVE_FORM => live::submit(form, &mut self.live, &self.client),
            CONFIG_FORM => config::save(form, &mut self.config, &self.client),
            _ => debug!(%form_id, "form has no handler"),
        }
    }

    fn load_config(&mut self) {
        if let Some(form) = self.document.form_mut(CONFIG_FORM) {
            config::load(form, &mut self.config, &self.client);
        }
    }
}
