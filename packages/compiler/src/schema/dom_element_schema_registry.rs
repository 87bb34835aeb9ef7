//! DOM Element Schema Registry
//!
//! A DOM schema covering the commonly bound HTML elements, encoded one element family per line
//! as `names^parent|properties`:
//!
//! - Elements separated by `,` have identical properties
//! - `^parent` inherits the parent's properties and events
//! - Property prefixes: (none) string, `*` event, `!` boolean, `#` number, `%` object

use std::collections::{HashMap, HashSet};

use once_cell::sync::Lazy;

use super::element_schema_registry::ElementSchemaRegistry;
use crate::core::SchemaMetadata;

const SCHEMA: &[&str] = &[
    "[Element]|textContent,%classList,className,id,innerHTML,outerHTML,#scrollLeft,#scrollTop,slot,*copy,*cut,*paste",
    "[HTMLElement]^[Element]|accessKey,contentEditable,dir,!draggable,!hidden,innerText,lang,outerText,!spellcheck,%style,#tabIndex,title,!translate,*blur,*change,*click,*dblclick,*focus,*input,*keydown,*keyup,*mousedown,*mouseenter,*mouseleave,*mouseup,*submit",
    "abbr,address,article,aside,b,code,em,footer,header,i,main,nav,section,small,strong,sub,sup,u^[HTMLElement]|",
    "a^[HTMLElement]|download,hash,host,href,hreflang,name,rel,target,text,type",
    "button^[HTMLElement]|!disabled,formAction,name,type,value",
    "div^[HTMLElement]|align",
    "form^[HTMLElement]|action,autocomplete,method,name,!noValidate,target",
    "h1,h2,h3,h4,h5,h6^[HTMLElement]|align",
    "img^[HTMLElement]|alt,#height,loading,src,srcset,#width",
    "input^[HTMLElement]|accept,alt,autocomplete,!checked,!disabled,%files,formAction,max,#maxLength,min,#minLength,!multiple,name,pattern,placeholder,!readOnly,!required,#size,src,step,type,value,#valueAsNumber",
    "label^[HTMLElement]|htmlFor",
    "li^[HTMLElement]|type,#value",
    "ol^[HTMLElement]|!reversed,#start,type",
    "option^[HTMLElement]|!disabled,label,!selected,text,value",
    "p^[HTMLElement]|align",
    "select^[HTMLElement]|!disabled,!multiple,name,!required,#selectedIndex,#size,value",
    "span^[HTMLElement]|",
    "table^[HTMLElement]|align,border,cellPadding,cellSpacing,summary,width",
    "td,th^[HTMLElement]|align,#colSpan,headers,#rowSpan",
    "textarea^[HTMLElement]|autocomplete,#cols,defaultValue,!disabled,#maxLength,name,placeholder,!readOnly,!required,#rows,value,wrap",
    "tr^[HTMLElement]|align",
    "ul^[HTMLElement]|type",
    ":svg:^[HTMLElement]|%style,#tabIndex",
    ":svg:svg^:svg:|",
    "unknown^[HTMLElement]|",
];

/// Attributes whose DOM property has a different name.
pub static ATTR_TO_PROP: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("class", "className"),
        ("for", "htmlFor"),
        ("formaction", "formAction"),
        ("innerHtml", "innerHTML"),
        ("readonly", "readOnly"),
        ("tabindex", "tabIndex"),
    ])
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyType {
    String,
    Boolean,
    Number,
    Object,
}

/// DOM Element Schema Registry implementation
#[derive(Debug, Clone)]
pub struct DomElementSchemaRegistry {
    schema: HashMap<String, HashMap<String, PropertyType>>,
    event_schema: HashMap<String, HashSet<String>>,
}

impl DomElementSchemaRegistry {
    pub fn new() -> Self {
        let mut schema: HashMap<String, HashMap<String, PropertyType>> = HashMap::new();
        let mut event_schema: HashMap<String, HashSet<String>> = HashMap::new();

        for encoded_type in SCHEMA {
            let Some((str_type, str_properties)) = encoded_type.split_once('|') else {
                continue;
            };
            let (type_names, super_name) = match str_type.split_once('^') {
                Some((names, parent)) => (names, Some(parent)),
                None => (str_type, None),
            };

            let mut properties = super_name
                .and_then(|parent| schema.get(&parent.to_lowercase()).cloned())
                .unwrap_or_default();
            let mut events = super_name
                .and_then(|parent| event_schema.get(&parent.to_lowercase()).cloned())
                .unwrap_or_default();

            for property in str_properties.split(',').filter(|p| !p.is_empty()) {
                let (kind, name) = match property.as_bytes()[0] {
                    b'*' => {
                        events.insert(property[1..].to_string());
                        continue;
                    }
                    b'!' => (PropertyType::Boolean, &property[1..]),
                    b'#' => (PropertyType::Number, &property[1..]),
                    b'%' => (PropertyType::Object, &property[1..]),
                    _ => (PropertyType::String, property),
                };
                properties.insert(name.to_string(), kind);
            }

            for tag in type_names.split(',') {
                schema.insert(tag.to_lowercase(), properties.clone());
                event_schema.insert(tag.to_lowercase(), events.clone());
            }
        }

        DomElementSchemaRegistry {
            schema,
            event_schema,
        }
    }

    pub fn property_type(&self, tag_name: &str, prop_name: &str) -> Option<PropertyType> {
        self.element_properties(tag_name)
            .and_then(|props| props.get(prop_name).copied())
    }

    pub fn has_event(&self, tag_name: &str, event_name: &str) -> bool {
        self.event_schema
            .get(&tag_name.to_lowercase())
            .map_or(false, |events| events.contains(event_name))
    }

    fn element_properties(&self, tag_name: &str) -> Option<&HashMap<String, PropertyType>> {
        self.schema
            .get(&tag_name.to_lowercase())
            .or_else(|| self.schema.get("unknown"))
    }
}

impl Default for DomElementSchemaRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn has_schema(schema_metas: &[SchemaMetadata], name: &str) -> bool {
    schema_metas.iter().any(|s| s.name == name)
}

/// `ng-container` and `ng-content`, with or without a namespace prefix.
fn is_angular_structural_tag(tag_name: &str) -> bool {
    let local = match tag_name.strip_prefix(':') {
        Some(rest) => rest.split_once(':').map_or(rest, |(_, name)| name),
        None => tag_name,
    };
    local == "ng-container" || local == "ng-content"
}

impl ElementSchemaRegistry for DomElementSchemaRegistry {
    fn has_property(
        &self,
        tag_name: &str,
        prop_name: &str,
        schema_metas: &[SchemaMetadata],
    ) -> bool {
        if has_schema(schema_metas, "no-errors-schema") {
            return true;
        }

        if tag_name.contains('-') {
            if is_angular_structural_tag(tag_name) {
                return false;
            }
            if has_schema(schema_metas, "custom-elements") {
                // Which properties a custom element gets is only known once it is defined.
                return true;
            }
        }

        self.element_properties(tag_name)
            .map_or(false, |props| props.contains_key(prop_name))
    }

    fn has_element(&self, tag_name: &str, schema_metas: &[SchemaMetadata]) -> bool {
        if has_schema(schema_metas, "no-errors-schema") {
            return true;
        }

        if tag_name.contains('-') {
            if is_angular_structural_tag(tag_name) {
                return true;
            }
            if has_schema(schema_metas, "custom-elements") {
                return true;
            }
        }

        self.schema.contains_key(&tag_name.to_lowercase())
    }

    fn get_mapped_prop_name(&self, prop_name: &str) -> String {
        ATTR_TO_PROP
            .get(prop_name)
            .copied()
            .unwrap_or(prop_name)
            .to_string()
    }
}
