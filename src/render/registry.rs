//! Static component registry.
//!
//! Built once at startup and shared read-only through application state.
//! Compound names (`Tabs.List`) and flat names (`TabsList`) point at the same
//! implementation.

use std::collections::BTreeMap;
use std::sync::Arc;

use super::Rendered;
use super::components::{
    Accordion, AccordionContent, AccordionItem, AccordionTrigger, Button, Checkbox, Input, Label, Tabs, TabsContent,
    TabsList, TabsTrigger,
};
use crate::markup::Props;

/// A UI implementation instantiated from literal props and rendered children.
pub trait Component: Send + Sync {
    fn render(&self, props: &Props, children: Vec<Rendered>) -> Rendered;
}

#[derive(Clone, Default)]
pub struct Registry {
    entries: BTreeMap<String, Arc<dyn Component>>,
}

impl Registry {
    /// An empty registry; every element falls back to its literal tag.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// The built-in component set.
    #[must_use]
    pub fn builtin() -> Self {
        let tabs_list: Arc<dyn Component> = Arc::new(TabsList);
        let tabs_trigger: Arc<dyn Component> = Arc::new(TabsTrigger);
        let tabs_content: Arc<dyn Component> = Arc::new(TabsContent);
        let accordion_item: Arc<dyn Component> = Arc::new(AccordionItem);
        let accordion_trigger: Arc<dyn Component> = Arc::new(AccordionTrigger);
        let accordion_content: Arc<dyn Component> = Arc::new(AccordionContent);

        Self::empty()
            .with("Button", Arc::new(Button))
            .with("Input", Arc::new(Input))
            .with("Label", Arc::new(Label))
            .with("Checkbox", Arc::new(Checkbox))
            .with("Tabs", Arc::new(Tabs))
            .with("TabsList", tabs_list.clone())
            .with("Tabs.List", tabs_list)
            .with("TabsTrigger", tabs_trigger.clone())
            .with("Tabs.Trigger", tabs_trigger)
            .with("TabsContent", tabs_content.clone())
            .with("Tabs.Content", tabs_content)
            .with("Accordion", Arc::new(Accordion))
            .with("AccordionItem", accordion_item.clone())
            .with("Accordion.Item", accordion_item)
            .with("AccordionTrigger", accordion_trigger.clone())
            .with("Accordion.Trigger", accordion_trigger)
            .with("AccordionContent", accordion_content.clone())
            .with("Accordion.Content", accordion_content)
    }

    /// Add an entry during construction.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, component: Arc<dyn Component>) -> Self {
        self.entries.insert(name.into(), component);
        self
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Arc<dyn Component>> {
        self.entries.get(name)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Registered names in sorted order.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.entries.keys().map(String::as_str).collect()
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry").field("names", &self.names()).finish()
    }
}

#[cfg(test)]
#[path = "registry_test.rs"]
mod tests;
