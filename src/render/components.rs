//! Built-in components: static markup with utility classes.
//!
//! Interactive widgets render their initial state only. `Tabs` and
//! `Accordion` pick the open item from the literal `defaultValue` and mark
//! their descendants through `data-slot` / `data-state` attributes.

use super::registry::Component;
use super::{Keyed, Rendered};
use crate::markup::{PropValue, Props};

// =============================================================================
// HELPERS
// =============================================================================

/// Join class fragments, then append a literal `className` prop.
fn class_list(parts: &[&str], props: &Props) -> String {
    let extra = props.get("className").and_then(PropValue::as_str);
    parts
        .iter()
        .copied()
        .chain(extra)
        .filter(|part| !part.trim().is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Copy props except `className` and the listed component-only keys.
fn passthrough(props: &Props, consumed: &[&str]) -> Props {
    props
        .iter()
        .filter(|(key, _)| key.as_str() != "className" && !consumed.contains(&key.as_str()))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

fn set(attrs: &mut Props, key: &str, value: &str) {
    attrs.insert(key.to_owned(), PropValue::Str(value.to_owned()));
}

fn set_flag(attrs: &mut Props, key: &str) {
    attrs.insert(key.to_owned(), PropValue::Bool(true));
}

/// Literal `value` prop as text, if any.
fn value_of(props: &Props, key: &str) -> Option<String> {
    match props.get(key)? {
        PropValue::Null | PropValue::Bool(_) => None,
        other => Some(other.to_text()),
    }
}

fn slot_of(attrs: &Props) -> Option<&str> {
    attrs.get("data-slot").and_then(PropValue::as_str)
}

/// Visit every element carrying a `data-slot`, without entering another
/// root with the `boundary` slot (a nested widget of the same kind).
fn visit_slots(nodes: &mut [Rendered], boundary: &str, visit: &mut dyn FnMut(&str, &mut Props, &mut [Rendered])) {
    for node in nodes {
        match node {
            Rendered::Element { attrs, children, .. } => {
                if let Some(slot) = slot_of(attrs).map(str::to_owned) {
                    if slot == boundary {
                        continue;
                    }
                    visit(&slot, attrs, children);
                }
                visit_slots(children, boundary, visit);
            }
            Rendered::Fragment(children) => {
                for Keyed { node, .. } in children {
                    visit_slots(std::slice::from_mut(node), boundary, visit);
                }
            }
            Rendered::Text(_) => {}
        }
    }
}

fn data_value(attrs: &Props) -> Option<&str> {
    attrs.get("data-value").and_then(PropValue::as_str)
}

// =============================================================================
// BUTTON
// =============================================================================

const BUTTON_BASE: &str = "inline-flex items-center justify-center gap-2 whitespace-nowrap rounded-md text-sm font-medium transition-colors focus-visible:outline-none focus-visible:ring-1 focus-visible:ring-ring disabled:pointer-events-none disabled:opacity-50";

fn button_variant(variant: Option<&str>) -> &'static str {
    match variant {
        Some("destructive") => "bg-destructive text-destructive-foreground shadow-sm hover:bg-destructive/90",
        Some("outline") => "border border-input bg-background shadow-sm hover:bg-accent hover:text-accent-foreground",
        Some("secondary") => "bg-secondary text-secondary-foreground shadow-sm hover:bg-secondary/80",
        Some("ghost") => "hover:bg-accent hover:text-accent-foreground",
        Some("link") => "text-primary underline-offset-4 hover:underline",
        _ => "bg-primary text-primary-foreground shadow hover:bg-primary/90",
    }
}

fn button_size(size: Option<&str>) -> &'static str {
    match size {
        Some("sm") => "h-8 rounded-md px-3 text-xs",
        Some("lg") => "h-10 rounded-md px-8",
        Some("icon") => "h-9 w-9",
        _ => "h-9 px-4 py-2",
    }
}

pub struct Button;

impl Component for Button {
    fn render(&self, props: &Props, children: Vec<Rendered>) -> Rendered {
        let variant = props.get("variant").and_then(PropValue::as_str);
        let size = props.get("size").and_then(PropValue::as_str);
        let mut attrs = passthrough(props, &["variant", "size", "asChild"]);
        attrs
            .entry("type".to_owned())
            .or_insert_with(|| PropValue::Str("button".to_owned()));
        set(&mut attrs, "className", &class_list(&[BUTTON_BASE, button_variant(variant), button_size(size)], props));
        Rendered::element("button", attrs, children)
    }
}

// =============================================================================
// FORM CONTROLS
// =============================================================================

pub struct Input;

impl Component for Input {
    fn render(&self, props: &Props, _children: Vec<Rendered>) -> Rendered {
        let mut attrs = passthrough(props, &[]);
        set(
            &mut attrs,
            "className",
            &class_list(
                &["flex h-9 w-full rounded-md border border-input bg-transparent px-3 py-1 text-sm shadow-sm transition-colors placeholder:text-muted-foreground focus-visible:outline-none focus-visible:ring-1 focus-visible:ring-ring disabled:cursor-not-allowed disabled:opacity-50"],
                props,
            ),
        );
        Rendered::element("input", attrs, Vec::new())
    }
}

pub struct Label;

impl Component for Label {
    fn render(&self, props: &Props, children: Vec<Rendered>) -> Rendered {
        let mut attrs = passthrough(props, &[]);
        set(
            &mut attrs,
            "className",
            &class_list(
                &["text-sm font-medium leading-none peer-disabled:cursor-not-allowed peer-disabled:opacity-70"],
                props,
            ),
        );
        Rendered::element("label", attrs, children)
    }
}

pub struct Checkbox;

impl Component for Checkbox {
    fn render(&self, props: &Props, _children: Vec<Rendered>) -> Rendered {
        let checked = ["checked", "defaultChecked"]
            .iter()
            .any(|key| props.get(*key).is_some_and(PropValue::is_truthy));
        let mut attrs = passthrough(props, &["checked", "defaultChecked"]);
        set(&mut attrs, "type", "button");
        set(&mut attrs, "role", "checkbox");
        set(&mut attrs, "aria-checked", if checked { "true" } else { "false" });
        set(&mut attrs, "data-state", if checked { "checked" } else { "unchecked" });
        set(
            &mut attrs,
            "className",
            &class_list(
                &["peer h-4 w-4 shrink-0 rounded-sm border border-primary shadow focus-visible:outline-none focus-visible:ring-1 focus-visible:ring-ring disabled:cursor-not-allowed disabled:opacity-50 data-[state=checked]:bg-primary data-[state=checked]:text-primary-foreground"],
                props,
            ),
        );
        let indicator = if checked {
            let mut span = Props::new();
            set(&mut span, "data-slot", "checkbox-indicator");
            set(&mut span, "className", "flex items-center justify-center text-current");
            vec![Rendered::element("span", span, vec![Rendered::text("✓")])]
        } else {
            Vec::new()
        };
        Rendered::element("button", attrs, indicator)
    }
}

// =============================================================================
// TABS
// =============================================================================

pub struct Tabs;

impl Component for Tabs {
    fn render(&self, props: &Props, mut children: Vec<Rendered>) -> Rendered {
        let selected = value_of(props, "defaultValue").or_else(|| value_of(props, "value"));
        visit_slots(&mut children, "tabs", &mut |slot, attrs, _| {
            let active = selected.is_some() && data_value(attrs) == selected.as_deref();
            match slot {
                "tabs-trigger" => {
                    set(attrs, "data-state", if active { "active" } else { "inactive" });
                    set(attrs, "aria-selected", if active { "true" } else { "false" });
                }
                "tabs-content" if active => {
                    set(attrs, "data-state", "active");
                    attrs.remove("hidden");
                }
                _ => {}
            }
        });

        let mut attrs = passthrough(props, &["defaultValue", "value", "orientation"]);
        set(&mut attrs, "data-slot", "tabs");
        set(&mut attrs, "className", &class_list(&["flex flex-col gap-2"], props));
        Rendered::element("div", attrs, children)
    }
}

pub struct TabsList;

impl Component for TabsList {
    fn render(&self, props: &Props, children: Vec<Rendered>) -> Rendered {
        let mut attrs = passthrough(props, &[]);
        set(&mut attrs, "role", "tablist");
        set(&mut attrs, "data-slot", "tabs-list");
        set(
            &mut attrs,
            "className",
            &class_list(
                &["inline-flex h-9 items-center justify-center rounded-lg bg-muted p-1 text-muted-foreground"],
                props,
            ),
        );
        Rendered::element("div", attrs, children)
    }
}

pub struct TabsTrigger;

impl Component for TabsTrigger {
    fn render(&self, props: &Props, children: Vec<Rendered>) -> Rendered {
        let mut attrs = passthrough(props, &["value"]);
        set(&mut attrs, "type", "button");
        set(&mut attrs, "role", "tab");
        set(&mut attrs, "data-slot", "tabs-trigger");
        if let Some(value) = value_of(props, "value") {
            set(&mut attrs, "data-value", &value);
        }
        set(&mut attrs, "data-state", "inactive");
        set(&mut attrs, "aria-selected", "false");
        set(
            &mut attrs,
            "className",
            &class_list(
                &["inline-flex items-center justify-center whitespace-nowrap rounded-md px-3 py-1 text-sm font-medium transition-all data-[state=active]:bg-background data-[state=active]:text-foreground data-[state=active]:shadow"],
                props,
            ),
        );
        Rendered::element("button", attrs, children)
    }
}

pub struct TabsContent;

impl Component for TabsContent {
    fn render(&self, props: &Props, children: Vec<Rendered>) -> Rendered {
        let mut attrs = passthrough(props, &["value"]);
        set(&mut attrs, "role", "tabpanel");
        set(&mut attrs, "data-slot", "tabs-content");
        if let Some(value) = value_of(props, "value") {
            set(&mut attrs, "data-value", &value);
        }
        set(&mut attrs, "data-state", "inactive");
        set_flag(&mut attrs, "hidden");
        set(&mut attrs, "className", &class_list(&["mt-2 focus-visible:outline-none"], props));
        Rendered::element("div", attrs, children)
    }
}

// =============================================================================
// ACCORDION
// =============================================================================

pub struct Accordion;

impl Component for Accordion {
    fn render(&self, props: &Props, mut children: Vec<Rendered>) -> Rendered {
        let open = value_of(props, "defaultValue").or_else(|| value_of(props, "value"));
        if let Some(open) = open {
            visit_slots(&mut children, "accordion", &mut |slot, attrs, item_children| {
                if slot != "accordion-item" || data_value(attrs) != Some(open.as_str()) {
                    return;
                }
                set(attrs, "data-state", "open");
                visit_slots(item_children, "accordion", &mut |part, attrs, _| match part {
                    "accordion-trigger" => {
                        set(attrs, "data-state", "open");
                        set(attrs, "aria-expanded", "true");
                    }
                    "accordion-content" => {
                        set(attrs, "data-state", "open");
                        attrs.remove("hidden");
                    }
                    _ => {}
                });
            });
        }

        let mut attrs = passthrough(props, &["defaultValue", "value", "type", "collapsible"]);
        set(&mut attrs, "data-slot", "accordion");
        set(&mut attrs, "className", &class_list(&["w-full"], props));
        Rendered::element("div", attrs, children)
    }
}

pub struct AccordionItem;

impl Component for AccordionItem {
    fn render(&self, props: &Props, children: Vec<Rendered>) -> Rendered {
        let mut attrs = passthrough(props, &["value"]);
        set(&mut attrs, "data-slot", "accordion-item");
        if let Some(value) = value_of(props, "value") {
            set(&mut attrs, "data-value", &value);
        }
        set(&mut attrs, "data-state", "closed");
        set(&mut attrs, "className", &class_list(&["border-b"], props));
        Rendered::element("div", attrs, children)
    }
}

pub struct AccordionTrigger;

impl Component for AccordionTrigger {
    fn render(&self, props: &Props, children: Vec<Rendered>) -> Rendered {
        let mut attrs = passthrough(props, &[]);
        set(&mut attrs, "type", "button");
        set(&mut attrs, "data-slot", "accordion-trigger");
        set(&mut attrs, "data-state", "closed");
        set(&mut attrs, "aria-expanded", "false");
        set(
            &mut attrs,
            "className",
            &class_list(
                &["flex flex-1 items-center justify-between py-4 text-sm font-medium transition-all hover:underline"],
                props,
            ),
        );
        let mut heading = Props::new();
        set(&mut heading, "className", "flex");
        Rendered::element("h3", heading, vec![Rendered::element("button", attrs, children)])
    }
}

pub struct AccordionContent;

impl Component for AccordionContent {
    fn render(&self, props: &Props, children: Vec<Rendered>) -> Rendered {
        let mut attrs = passthrough(props, &[]);
        set(&mut attrs, "role", "region");
        set(&mut attrs, "data-slot", "accordion-content");
        set(&mut attrs, "data-state", "closed");
        set_flag(&mut attrs, "hidden");
        set(&mut attrs, "className", &class_list(&["overflow-hidden pb-4 pt-0 text-sm"], props));
        Rendered::element("div", attrs, children)
    }
}

#[cfg(test)]
#[path = "components_test.rs"]
mod tests;
