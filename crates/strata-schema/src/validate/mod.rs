//! Schema validation run once per class at registration.

pub mod naming;

use crate::{
    err,
    error::ErrorTree,
    node::{Property, Schema, Type},
};
use std::collections::BTreeSet;

/// Validate a provider schema: the class name, every property name, and
/// every nested type.
pub fn validate_schema(schema: &Schema) -> Result<(), ErrorTree> {
    let mut errs = ErrorTree::new();

    if let Err(msg) = naming::validate_model_name(&schema.name) {
        errs.add(msg);
    }
    validate_props(&schema.props, &mut errs);

    errs.result()
}

fn validate_props(props: &[Property], errs: &mut ErrorTree) {
    let mut seen = BTreeSet::new();

    for prop in props {
        if let Err(msg) = naming::validate_field_name(&prop.name) {
            errs.add(msg);
            continue;
        }

        if !seen.insert(prop.name.as_str()) {
            err!(errs, "duplicate property '{}'", prop.name);
        }

        if let Some(ty) = &prop.ty {
            let mut prop_errs = ErrorTree::new();
            validate_type(ty, &mut prop_errs);
            errs.merge_for(prop.name.clone(), prop_errs);
        }
    }
}

fn validate_type(ty: &Type, errs: &mut ErrorTree) {
    match ty {
        Type::Primitive(_) => {}
        Type::Array { element } => validate_type(element, errs),
        Type::Reference { name } => {
            if name.is_empty() {
                errs.add("reference name is empty");
            }
        }
        Type::Parameterized {
            self_type,
            argument,
        } => {
            if self_type.is_empty() {
                errs.add("parameterized self type is empty");
            }
            validate_type(argument, errs);
        }
        Type::Generic {
            parameter_name,
            parameter_type,
        } => {
            if parameter_name.is_empty() {
                errs.add("generic parameter name is empty");
            }
            validate_type(parameter_type, errs);
        }
        Type::Literal { props } => validate_props(props, errs),
        Type::Union { union } => {
            if union.is_empty() {
                errs.add("union has no members");
            }
            for member in union {
                validate_type(member, errs);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Error, types::Primitive};

    #[test]
    fn accepts_well_formed_schema() {
        let schema = Schema::new("User")
            .prop(Property::new("name", Type::reference("Name")).optional())
            .prop(Property::new("tags", Type::array(Type::string())))
            .prop(Property::method("greet"));

        assert!(validate_schema(&schema).is_ok());
    }

    #[test]
    fn reports_duplicates_and_nested_errors() {
        let schema = Schema::new("User")
            .prop(Property::new("a", Type::string()))
            .prop(Property::new("a", Type::number()))
            .prop(Property::new(
                "b",
                Type::literal(vec![Property::new("", Type::string())]),
            ))
            .prop(Property::new("c", Type::union(Vec::new())));

        let errs = validate_schema(&schema).unwrap_err();
        let flat = errs.flatten();

        assert!(flat.contains(&(String::new(), "duplicate property 'a'".to_string())));
        assert!(flat.contains(&("b".to_string(), "field name is empty".to_string())));
        assert!(flat.contains(&("c".to_string(), "union has no members".to_string())));
    }

    #[test]
    fn from_json_parses_and_validates() {
        let schema = Schema::from_json(
            r#"{"name":"Name","props":[
                {"name":"first","optional":false,"modifier":"PUBLIC","type":"string","readonly":true},
                {"name":"_secret","optional":false,"modifier":"PRIVATE","type":"number"}
            ]}"#,
        )
        .unwrap();

        assert_eq!(schema.props.len(), 2);
        assert!(schema.props[0].readonly);
        assert!(!schema.props[1].is_public());
        assert_eq!(
            schema.props[1].ty,
            Some(Type::Primitive(Primitive::Number))
        );

        let err = Schema::from_json(r#"{"name":"","props":[]}"#).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }
}
