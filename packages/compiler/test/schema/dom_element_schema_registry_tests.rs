use ngtcb_compiler::core::{custom_elements_schema, no_errors_schema};
use ngtcb_compiler::schema::{DomElementSchemaRegistry, ElementSchemaRegistry, PropertyType};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_detect_elements() {
        let registry = DomElementSchemaRegistry::new();
        assert!(registry.has_element("div", &[]));
        assert!(registry.has_element("b", &[]));
        assert!(registry.has_element("DIV", &[]));
        assert!(!registry.has_element("abc", &[]));
        assert!(!registry.has_element("my-cmp", &[]));
    }

    #[test]
    fn should_detect_properties_on_regular_elements() {
        let registry = DomElementSchemaRegistry::new();
        assert!(registry.has_property("div", "id", &[]));
        assert!(registry.has_property("div", "title", &[]));
        assert!(registry.has_property("input", "value", &[]));
        assert!(registry.has_property("label", "htmlFor", &[]));
        assert!(!registry.has_property("div", "unknown", &[]));
        assert!(!registry.has_property("div", "value", &[]));
    }

    #[test]
    fn should_inherit_properties_from_the_parent_element() {
        let registry = DomElementSchemaRegistry::new();
        assert!(registry.has_property("button", "className", &[]));
        assert!(registry.has_property("button", "tabIndex", &[]));
        assert_eq!(
            registry.property_type("input", "checked"),
            Some(PropertyType::Boolean)
        );
        assert_eq!(
            registry.property_type("input", "tabIndex"),
            Some(PropertyType::Number)
        );
        assert_eq!(registry.property_type("a", "href"), Some(PropertyType::String));
    }

    #[test]
    fn should_fall_back_to_the_unknown_element_for_properties() {
        let registry = DomElementSchemaRegistry::new();
        assert!(registry.has_property("some-thing-else", "title", &[]));
        assert!(registry.has_property("abc", "title", &[]));
        assert!(!registry.has_property("abc", "href", &[]));
    }

    #[test]
    fn should_detect_events() {
        let registry = DomElementSchemaRegistry::new();
        assert!(registry.has_event("div", "click"));
        assert!(registry.has_event("input", "input"));
        assert!(!registry.has_event("div", "notAnEvent"));
    }

    #[test]
    fn should_allow_anything_with_the_no_errors_schema() {
        let registry = DomElementSchemaRegistry::new();
        let schemas = [no_errors_schema()];
        assert!(registry.has_element("not-an-element", &schemas));
        assert!(registry.has_property("div", "whatever", &schemas));
    }

    #[test]
    fn should_allow_custom_elements_with_the_custom_elements_schema() {
        let registry = DomElementSchemaRegistry::new();
        let schemas = [custom_elements_schema()];
        assert!(registry.has_element("my-cmp", &schemas));
        assert!(registry.has_property("my-cmp", "anything", &schemas));
        assert!(!registry.has_element("abc", &schemas));
    }

    #[test]
    fn should_treat_ng_container_and_ng_content_specially() {
        let registry = DomElementSchemaRegistry::new();
        assert!(registry.has_element("ng-container", &[]));
        assert!(registry.has_element("ng-content", &[]));
        assert!(!registry.has_property("ng-container", "id", &[custom_elements_schema()]));
        assert!(!registry.has_property(":svg:ng-container", "id", &[]));
    }

    #[test]
    fn should_map_attribute_names_to_properties() {
        let registry = DomElementSchemaRegistry::new();
        assert_eq!(registry.get_mapped_prop_name("class"), "className");
        assert_eq!(registry.get_mapped_prop_name("for"), "htmlFor");
        assert_eq!(registry.get_mapped_prop_name("readonly"), "readOnly");
        assert_eq!(registry.get_mapped_prop_name("title"), "title");
    }
}
