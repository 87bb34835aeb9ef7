use ngtcb_compiler::directive_matching::{create_css_selector, CssSelector, SelectorMatcher};

#[cfg(test)]
mod tests {
    use super::*;

    // Helper to get a selector for given properties
    fn get_selector_for(
        tag: Option<&str>,
        attrs: Vec<(&str, &str)>,
        classes: Option<&str>,
    ) -> CssSelector {
        let mut selector = CssSelector::new();
        if let Some(t) = tag {
            selector.set_element(t);
        }
        for (name, value) in attrs {
            selector.add_attribute(name, value);
        }
        if let Some(c) = classes {
            for c_name in c.trim().split_whitespace() {
                selector.add_class_name(c_name);
            }
        }
        selector
    }

    fn matcher_for(selectors: &[(&str, i32)]) -> SelectorMatcher<i32> {
        let mut matcher = SelectorMatcher::new();
        for (selector, data) in selectors {
            matcher.add_selectables(CssSelector::parse(selector).unwrap(), *data);
        }
        matcher
    }

    fn matches(matcher: &SelectorMatcher<i32>, target: &CssSelector) -> Vec<i32> {
        let mut matched = Vec::new();
        matcher.match_selector(target, |_, data| matched.push(*data));
        matched
    }

    #[test]
    fn should_select_by_element_name_case_sensitive() {
        let matcher = matcher_for(&[("someTag", 1)]);

        assert!(matches(&matcher, &get_selector_for(Some("SOMEOTHERTAG"), vec![], None)).is_empty());
        assert!(matches(&matcher, &get_selector_for(Some("SOMETAG"), vec![], None)).is_empty());
        assert_eq!(
            matches(&matcher, &get_selector_for(Some("someTag"), vec![], None)),
            vec![1]
        );
    }

    #[test]
    fn should_select_by_class_name_case_insensitive() {
        let matcher = matcher_for(&[(".someClass", 1), (".someClass.class2", 2)]);

        assert!(matches(&matcher, &get_selector_for(None, vec![], Some("SOMEOTHERCLASS"))).is_empty());
        assert_eq!(
            matches(&matcher, &get_selector_for(None, vec![], Some("SOMECLASS"))),
            vec![1]
        );
        assert_eq!(
            matches(&matcher, &get_selector_for(None, vec![], Some("someClass class2"))),
            vec![1, 2]
        );
    }

    #[test]
    fn should_select_by_attr_name_and_value() {
        let matcher = matcher_for(&[("[some-attr]", 1), ("[some-attr=someValue]", 2)]);

        assert!(matches(&matcher, &get_selector_for(None, vec![("SOME-ATTR", "")], None)).is_empty());
        assert_eq!(
            matches(&matcher, &get_selector_for(None, vec![("some-attr", "")], None)),
            vec![1]
        );
        assert_eq!(
            matches(
                &matcher,
                &get_selector_for(None, vec![("some-attr", "SOMEVALUE")], None)
            ),
            vec![1, 2]
        );
    }

    #[test]
    fn should_select_by_element_name_class_and_attribute() {
        let matcher = matcher_for(&[("someTag.someClass[someAttr]", 1)]);

        assert!(matches(&matcher, &get_selector_for(Some("someTag"), vec![], Some("someClass"))).is_empty());
        assert_eq!(
            matches(
                &matcher,
                &get_selector_for(Some("someTag"), vec![("someAttr", "")], Some("someClass"))
            ),
            vec![1]
        );
    }

    #[test]
    fn should_select_with_not_selectors() {
        let matcher = matcher_for(&[("p:not(.someClass)", 1), (":not([a])", 2)]);

        assert_eq!(
            matches(&matcher, &get_selector_for(Some("p"), vec![], None)),
            vec![1, 2]
        );
        assert!(matches(&matcher, &get_selector_for(Some("p"), vec![("a", "")], Some("someClass"))).is_empty());
        assert_eq!(
            matches(&matcher, &get_selector_for(Some("div"), vec![], Some("someClass"))),
            vec![2]
        );
    }

    #[test]
    fn should_invoke_the_callback_once_per_selectable() {
        let matcher = matcher_for(&[("input, [ngModel]", 1)]);

        assert_eq!(
            matches(
                &matcher,
                &get_selector_for(Some("input"), vec![("ngModel", "")], None)
            ),
            vec![1]
        );
    }

    #[test]
    fn should_match_an_element_selector_built_from_attributes() {
        let matcher = matcher_for(&[(".foo", 1), ("[type=text]", 2)]);
        let target = create_css_selector(
            "input",
            &[
                ("class".to_string(), "bar foo".to_string()),
                ("type".to_string(), "text".to_string()),
            ],
        );

        assert_eq!(matches(&matcher, &target), vec![1, 2]);
    }

    #[test]
    fn should_parse_and_stringify_selectors() {
        let parsed = CssSelector::parse("a.b[c=d]:not(.e), #f").unwrap();
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0].to_string(), "a.b[c=d]:not(.e)");
        assert_eq!(parsed[1].to_string(), "[id=f]");
        assert_eq!(parsed[1].get_attr("id"), Some("f"));
    }

    #[test]
    fn should_use_a_universal_element_for_bare_not_selectors() {
        let parsed = CssSelector::parse(":not(span)").unwrap();
        assert_eq!(parsed[0].element.as_deref(), Some("*"));
    }

    #[test]
    fn should_reject_nested_not_selectors() {
        assert!(CssSelector::parse(":not(:not(a))").is_err());
        assert!(CssSelector::parse(":not(a, b)").is_err());
    }
}
