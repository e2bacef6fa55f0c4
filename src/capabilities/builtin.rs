//! Built-in capability definitions compiled into the crate.

/// Names of the built-in capabilities.
pub const NOTIFY: &str = "notify";
pub const STORE: &str = "store";
pub const SHAPE: &str = "shape";
pub const PRINTER: &str = "printer";
pub const COLOR_PRINTER: &str = "color_printer";
pub const SCANNER: &str = "scanner";
pub const COPIER: &str = "copier";
pub const BIRD: &str = "bird";
pub const FLYABLE: &str = "flyable";
pub const SWIMMABLE: &str = "swimmable";
pub const RUNNING: &str = "running";
pub const PAYMENT: &str = "payment";
pub const DISCOUNT: &str = "discount";
pub const REPORT_FORMAT: &str = "report_format";
pub const LOGGER: &str = "logger";

/// YAML sources, in declaration order.
pub const DEFINITIONS: &[(&str, &str)] = &[
    ("notify.yaml", include_str!("../../capabilities/notify.yaml")),
    ("store.yaml", include_str!("../../capabilities/store.yaml")),
    ("shape.yaml", include_str!("../../capabilities/shape.yaml")),
    ("office.yaml", include_str!("../../capabilities/office.yaml")),
    ("birds.yaml", include_str!("../../capabilities/birds.yaml")),
    ("commerce.yaml", include_str!("../../capabilities/commerce.yaml")),
    ("reporting.yaml", include_str!("../../capabilities/reporting.yaml")),
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capabilities::registry::parse_definitions;

    #[test]
    fn test_builtin_definitions_parse_and_validate() {
        let mut names = Vec::new();
        for (file, yaml) in DEFINITIONS {
            let caps = parse_definitions(yaml).unwrap_or_else(|e| panic!("{}: {}", file, e));
            for cap in caps {
                cap.validate().unwrap();
                names.push(cap.name);
            }
        }
        assert_eq!(
            names,
            vec![
                NOTIFY,
                STORE,
                SHAPE,
                PRINTER,
                COLOR_PRINTER,
                SCANNER,
                COPIER,
                BIRD,
                FLYABLE,
                SWIMMABLE,
                RUNNING,
                PAYMENT,
                DISCOUNT,
                REPORT_FORMAT,
                LOGGER,
            ]
        );
    }
}
