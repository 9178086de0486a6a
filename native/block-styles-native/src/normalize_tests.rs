#[cfg(test)]
mod tests {
    use crate::escape::NoEscapes;
    use crate::normalize::{camel_case_to_dash, normalize, normalize_with};
    use serde_json::json;

    fn css(property: &str, value: serde_json::Value) -> Option<String> {
        normalize(property, &value).map(|d| d.to_string())
    }

    #[test]
    fn test_pixel_unit_added_to_numbers() {
        assert_eq!(css("margin-top", json!(10)).unwrap(), "margin-top: 10px;");
        assert_eq!(css("width", json!(12.5)).unwrap(), "width: 12.5px;");
    }

    #[test]
    fn test_zero_keeps_no_unit() {
        assert_eq!(css("margin-top", json!(0)).unwrap(), "margin-top: 0;");
        assert_eq!(css("margin-top", json!(0.0)).unwrap(), "margin-top: 0;");
    }

    #[test]
    fn test_numbers_outside_allow_list_stay_bare() {
        assert_eq!(css("opacity", json!(0.5)).unwrap(), "opacity: 0.5;");
        assert_eq!(css("zIndex", json!(10)).unwrap(), "z-index: 10;");
        assert_eq!(css("line-height", json!(2.0)).unwrap(), "line-height: 2;");
    }

    #[test]
    fn test_plain_strings_untouched() {
        assert_eq!(css("color", json!("red")).unwrap(), "color: red;");
        assert_eq!(css("width", json!("50%")).unwrap(), "width: 50%;");
    }

    #[test]
    fn test_numeric_strings_get_pixels_for_any_property() {
        assert_eq!(css("top", json!("15")).unwrap(), "top: 15px;");
        assert_eq!(css("--gap", json!("-1.5")).unwrap(), "--gap: -1.5px;");
    }

    #[test]
    fn test_important_preserved() {
        assert_eq!(
            css("width", json!("50% !important")).unwrap(),
            "width: 50% !important;"
        );
        assert_eq!(
            css("paddingTop", json!("20 !important")).unwrap(),
            "padding-top: 20px !important;"
        );
    }

    #[test]
    fn test_false_and_null_dropped() {
        assert!(css("color", json!(false)).is_none());
        assert!(css("color", json!(null)).is_none());
        assert!(css("color", json!({ "a": 1 })).is_none());
    }

    #[test]
    fn test_true_passes_through() {
        assert_eq!(css("--flag", json!(true)).unwrap(), "--flag: true;");
    }

    #[test]
    fn test_camel_case_to_dash() {
        assert_eq!(camel_case_to_dash("borderTopLeftRadius"), "border-top-left-radius");
        assert_eq!(camel_case_to_dash("margin-top"), "margin-top");
        assert_eq!(camel_case_to_dash("--gkt-grid__gap"), "--gkt-grid__gap");
    }

    #[test]
    fn test_capital_runs_split_per_letter() {
        assert_eq!(camel_case_to_dash("aBC"), "a-b-c");
        assert_eq!(camel_case_to_dash("grid2Col"), "grid2-col");
        assert_eq!(camel_case_to_dash("WebkitBoxShadow"), "webkit-box-shadow");
    }

    #[test]
    fn test_extreme_numbers_use_exponent_notation() {
        assert_eq!(css("fontSize", json!(1e21)).unwrap(), "font-size: 1e+21px;");
        assert_eq!(css("fontSize", json!(2.5e22)).unwrap(), "font-size: 2.5e+22px;");
        assert_eq!(css("opacity", json!(1e-7)).unwrap(), "opacity: 1e-7;");
        assert_eq!(css("width", json!(1e20)).unwrap(), "width: 100000000000000000000px;");
    }

    #[test]
    fn test_legacy_quotes_decoded_in_values() {
        assert_eq!(
            css("fontFamily", json!("u0022Open Sansu0022, serif")).unwrap(),
            "font-family: \"Open Sans\", serif;"
        );
        assert_eq!(
            css("content", json!("u0027xu0027")).unwrap(),
            "content: 'x';"
        );
    }

    #[test]
    fn test_passthrough_decoder_keeps_codes() {
        let decl = normalize_with(&NoEscapes, "content", &json!("u0027xu0027")).unwrap();
        assert_eq!(decl.value, "u0027xu0027");
    }
}
