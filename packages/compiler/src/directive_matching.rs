/**
 * Directive Matching - CSS Selector Matching
 *
 * Parses directive selectors (`tag`, `.class`, `#id`, `[attr]`, `[attr=value]`, `:not(...)`,
 * comma alternatives) and matches them against the selector of a template element.
 */
use once_cell::sync::Lazy;
use regex::Regex;

static SELECTOR_REGEXP: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(:not\()|(([.#]?)[-\w]+)|(?:\[([-.\w*\\$]+)(?:=(?:"([^"]*)"|'([^']*)'|([^\]]*)))?\])|(\))|(\s*,\s*)"#)
        .unwrap_or_else(|_| unreachable!("selector pattern is a valid regex"))
});

const NOT: usize = 1;
const TAG: usize = 2;
const PREFIX: usize = 3;
const ATTRIBUTE: usize = 4;
const ATTRIBUTE_VALUE_DOUBLE: usize = 5;
const ATTRIBUTE_VALUE_SINGLE: usize = 6;
const ATTRIBUTE_VALUE_UNQUOTED: usize = 7;
const NOT_END: usize = 8;
const SEPARATOR: usize = 9;

/// The selector parsed tokens apply to: the open `:not(...)` if any, else `current`.
fn selector_in_scope(current: &mut CssSelector, in_not: bool) -> &mut CssSelector {
    if in_not && !current.not_selectors.is_empty() {
        let last = current.not_selectors.len() - 1;
        &mut current.not_selectors[last]
    } else {
        current
    }
}

/// CSS Selector representation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CssSelector {
    pub element: Option<String>,
    pub class_names: Vec<String>,
    /// Attribute name/value pairs; an empty value matches any value.
    pub attrs: Vec<(String, String)>,
    pub not_selectors: Vec<CssSelector>,
}

impl CssSelector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a selector string into its comma-separated alternatives.
    pub fn parse(selector: &str) -> Result<Vec<CssSelector>, String> {
        let mut results = Vec::new();
        let mut current = CssSelector::new();
        let mut in_not = false;

        for cap in SELECTOR_REGEXP.captures_iter(selector) {
            if cap.get(NOT).is_some() {
                if in_not {
                    return Err("Nesting :not in a selector is not allowed".to_string());
                }
                in_not = true;
                current.not_selectors.push(CssSelector::new());
            }

            let target = selector_in_scope(&mut current, in_not);

            if let Some(tag) = cap.get(TAG) {
                let tag = tag.as_str();
                match cap.get(PREFIX).map(|m| m.as_str()).unwrap_or("") {
                    "#" => target.add_attribute("id", &tag[1..]),
                    "." => target.add_class_name(&tag[1..]),
                    _ => target.set_element(tag),
                }
            }

            if let Some(attr) = cap.get(ATTRIBUTE) {
                let value = cap
                    .get(ATTRIBUTE_VALUE_DOUBLE)
                    .or_else(|| cap.get(ATTRIBUTE_VALUE_SINGLE))
                    .or_else(|| cap.get(ATTRIBUTE_VALUE_UNQUOTED))
                    .map(|m| m.as_str())
                    .unwrap_or("");
                target.add_attribute(&attr.as_str().replace("\\$", "$"), value);
            }

            if cap.get(NOT_END).is_some() {
                in_not = false;
            }

            if cap.get(SEPARATOR).is_some() {
                if in_not {
                    return Err("Multiple selectors in :not are not supported".to_string());
                }
                results.push(std::mem::take(&mut current).with_universal_element());
            }
        }

        results.push(current.with_universal_element());
        Ok(results)
    }

    fn with_universal_element(mut self) -> Self {
        if !self.not_selectors.is_empty()
            && self.element.is_none()
            && self.class_names.is_empty()
            && self.attrs.is_empty()
        {
            self.element = Some("*".to_string());
        }
        self
    }

    pub fn set_element(&mut self, element: &str) {
        self.element = Some(element.to_string());
    }

    pub fn add_attribute(&mut self, name: &str, value: &str) {
        self.attrs.push((name.to_string(), value.to_lowercase()));
    }

    pub fn add_class_name(&mut self, name: &str) {
        self.class_names.push(name.to_lowercase());
    }

    pub fn get_attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(attr, _)| attr == name)
            .map(|(_, value)| value.as_str())
    }

    /// Whether this selector (as a pattern) matches the concrete `target`.
    fn matches(&self, target: &CssSelector) -> bool {
        if let Some(element) = &self.element {
            if element != "*" && target.element.as_deref() != Some(element.as_str()) {
                return false;
            }
        }
        if !self
            .class_names
            .iter()
            .all(|class| target.class_names.contains(class))
        {
            return false;
        }
        let attrs_match = self.attrs.iter().all(|(name, value)| {
            target.attrs.iter().any(|(target_name, target_value)| {
                target_name == name && (value.is_empty() || target_value.eq_ignore_ascii_case(value))
            })
        });
        attrs_match && !self.not_selectors.iter().any(|not| not.matches(target))
    }
}

impl std::fmt::Display for CssSelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.element.as_deref().unwrap_or(""))?;
        for class_name in &self.class_names {
            write!(f, ".{}", class_name)?;
        }
        for (name, value) in &self.attrs {
            let name = name.replace('$', "\\$");
            if value.is_empty() {
                write!(f, "[{}]", name)?;
            } else {
                write!(f, "[{}={}]", name, value)?;
            }
        }
        for not_selector in &self.not_selectors {
            write!(f, ":not({})", not_selector)?;
        }
        Ok(())
    }
}

/// Builds the selector describing a concrete element: its tag, attributes and classes.
pub fn create_css_selector(element_name: &str, attributes: &[(String, String)]) -> CssSelector {
    let mut selector = CssSelector::new();
    selector.set_element(element_name);
    for (name, value) in attributes {
        selector.add_attribute(name, value);
        if name.eq_ignore_ascii_case("class") {
            for class_name in value.split_whitespace() {
                selector.add_class_name(class_name);
            }
        }
    }
    selector
}

/// Selector Matcher - matches concrete element selectors against registered patterns
pub struct SelectorMatcher<T> {
    selectables: Vec<(usize, CssSelector, T)>,
    counter: usize,
}

impl<T> Default for SelectorMatcher<T> {
    fn default() -> Self {
        SelectorMatcher {
            selectables: Vec::new(),
            counter: 0,
        }
    }
}

impl<T> SelectorMatcher<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers all alternatives of one selector under the same data.
    pub fn add_selectables(&mut self, selectors: Vec<CssSelector>, callback_data: T)
    where
        T: Clone,
    {
        let id = self.counter;
        self.counter += 1;
        for selector in selectors {
            self.selectables.push((id, selector, callback_data.clone()));
        }
    }

    /// Invokes `callback` once per registered selectable matching `target`, in registration
    /// order. Returns whether anything matched.
    pub fn match_selector<F>(&self, target: &CssSelector, mut callback: F) -> bool
    where
        F: FnMut(&CssSelector, &T),
    {
        let mut matched_ids = Vec::new();
        for (id, selector, data) in &self.selectables {
            if matched_ids.contains(id) || !selector.matches(target) {
                continue;
            }
            matched_ids.push(*id);
            callback(selector, data);
        }
        !matched_ids.is_empty()
    }
}
