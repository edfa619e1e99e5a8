//! Integration tests for the enrichment pipeline.

use formmeta::{
    Conditional, Enricher, GroupIndex, GroupPattern, QueryParams, SchemaRole, StaticSource,
};
use serde_json::{json, Value};

/// A document modeling an HR employees resource with CRUD siblings, an
/// envelope-wrapped list response, and annotated fields.
fn hr_document() -> Value {
    json!({
        "paths": {
            "/api/hr/employees/all": {
                "get": {
                    "responses": {
                        "200": { "$ref": "#/definitions/ResponseEnvelopeListEmployeeView" }
                    }
                }
            },
            "/api/hr/employees": { "post": {} },
            "/api/hr/employees/{id}": { "get": {}, "put": {}, "delete": {} },
            "/api/hr/employees/filter": {
                "post": {
                    "requestBody": {
                        "type": "object",
                        "properties": {
                            "page": { "type": "integer" },
                            "filter": { "$ref": "#/definitions/EmployeeFilter" }
                        }
                    },
                    "responses": {
                        "200": { "$ref": "#/definitions/ResponseEnvelopeListEmployeeView" }
                    }
                }
            }
        },
        "definitions": {
            "EmployeeView": {
                "type": "object",
                "properties": {
                    "id": { "type": "string" },
                    "firstName": {
                        "type": "string",
                        "x-constraints": { "notBlank": true, "size": { "min": 1, "max": 60 } }
                    },
                    "email": { "type": "string" },
                    "salary": { "type": "number" },
                    "status": {
                        "type": "string",
                        "enum": ["active", "on_leave", "terminated"]
                    },
                    "jobDescription": { "type": "string" },
                    "hireDate": { "type": "string", "format": "date" },
                    "department": { "$ref": "#/definitions/DepartmentView" }
                }
            },
            "DepartmentView": {
                "type": "object",
                "properties": {
                    "name": { "type": "string" },
                    "costCenter": { "type": "string" }
                }
            },
            "EmployeeFilter": {
                "type": "object",
                "properties": {
                    "name": { "type": "string" },
                    "hired": {
                        "type": "array",
                        "minItems": 2,
                        "maxItems": 2,
                        "items": { "type": "string", "format": "date" }
                    }
                }
            },
            "ResponseEnvelopeListEmployeeView": {
                "type": "object",
                "properties": {
                    "data": {
                        "type": "array",
                        "items": { "$ref": "#/definitions/EmployeeView" }
                    }
                }
            }
        }
    })
}

fn enricher() -> Enricher<StaticSource> {
    Enricher::new(
        StaticSource::new(hr_document()),
        GroupIndex::new(vec![
            GroupPattern::new("default", vec!["/**".into()]),
            GroupPattern::new("hr", vec!["/api/hr/**".into()]),
        ]),
    )
}

fn fresh(outcome: Conditional) -> Value {
    match outcome {
        Conditional::Fresh { payload, .. } => payload,
        other => panic!("expected fresh payload, got {other:?}"),
    }
}

mod scenario {
    use super::*;

    /// The end-to-end scenario: envelope-of-list unwraps to EmployeeView and
    /// the sibling routes light up the capability map.
    #[test]
    fn employees_all_resolves_employee_view() {
        let params = QueryParams::new("/api/hr/employees/all", "get");
        let payload = fresh(enricher().query(params, None).unwrap());

        assert_eq!(payload["group"], "hr");
        assert_eq!(payload["schemaName"], "EmployeeView");
        assert_eq!(payload["resource"]["capabilities"]["all"], true);
        assert_eq!(payload["resource"]["capabilities"]["byId"], true);
        assert_eq!(payload["resource"]["idFieldFound"], true);
    }

    #[test]
    fn inference_covers_field_vocabulary() {
        let params = QueryParams::new("/api/hr/employees/all", "get");
        let payload = fresh(enricher().query(params, None).unwrap());
        let props = &payload["schema"]["properties"];

        // shape: plain string
        assert_eq!(props["firstName"]["controlType"], "input");
        // naming: email control
        assert_eq!(props["email"]["controlType"], "email");
        // naming: salary is currency
        assert_eq!(props["salary"]["controlType"], "number");
        assert_eq!(props["salary"]["dataType"], "currency");
        // shape: 3-value enum renders as radio, options carried
        assert_eq!(props["status"]["controlType"], "radio");
        assert_eq!(
            props["status"]["options"],
            json!(["active", "on_leave", "terminated"])
        );
        // naming: description is multi-line
        assert_eq!(props["jobDescription"]["controlType"], "textarea");
        // format: date picker
        assert_eq!(props["hireDate"]["controlType"], "datepicker");
    }

    #[test]
    fn constraints_become_validation_and_messages() {
        let params = QueryParams::new("/api/hr/employees/all", "get");
        let payload = fresh(enricher().query(params, None).unwrap());
        let first = &payload["schema"]["properties"]["firstName"];

        assert_eq!(first["validation"]["required"], true);
        assert_eq!(first["validation"]["minLength"], 1);
        assert_eq!(first["validation"]["maxLength"], 60);
        assert_eq!(first["messages"]["required"], "First name is required");
        // Consumed records are stripped from the output.
        assert!(first.get("x-constraints").is_none());
    }

    #[test]
    fn request_role_resolves_filter_payload() {
        let params =
            QueryParams::new("/api/hr/employees/filter", "post").role(SchemaRole::Request);
        let payload = fresh(enricher().query(params, None).unwrap());

        assert_eq!(payload["schemaName"], "EmployeeFilter");
        // Two-element date array in a filter context is a range control.
        assert_eq!(
            payload["schema"]["properties"]["hired"]["controlType"],
            "daterange"
        );
    }
}

mod routing {
    use super::*;

    #[test]
    fn best_match_beats_catch_all() {
        let idx = GroupIndex::new(vec![
            GroupPattern::new("A", vec!["/**".into()]),
            GroupPattern::new("B", vec!["/api/hr/**".into()]),
        ]);
        assert_eq!(idx.resolve("/api/hr/employees/all"), Some("B"));
    }

    #[test]
    fn group_travels_into_payload() {
        let params = QueryParams::new("/api/hr/employees/all", "get");
        let payload = fresh(enricher().query(params, None).unwrap());
        assert_eq!(payload["group"], "hr");
    }
}

mod revalidation {
    use super::*;

    #[test]
    fn second_request_with_validator_is_not_modified() {
        let enricher = enricher();
        let params = QueryParams::new("/api/hr/employees/all", "get");

        let first = enricher.query(params.clone(), None).unwrap();
        let etag = first.etag().to_string();
        assert!(matches!(first, Conditional::Fresh { .. }));
        assert!(etag.starts_with('"') && etag.ends_with('"'));

        let second = enricher.query(params, Some(&etag)).unwrap();
        assert!(matches!(second, Conditional::NotModified { .. }));
    }

    #[test]
    fn different_cache_keys_do_not_collide() {
        let enricher = enricher();
        let response = QueryParams::new("/api/hr/employees/filter", "post");
        let request =
            QueryParams::new("/api/hr/employees/filter", "post").role(SchemaRole::Request);

        let a = enricher.query(response, None).unwrap();
        let b = enricher.query(request, None).unwrap();
        assert_ne!(a.etag(), b.etag());
    }

    #[test]
    fn cache_clear_reports_counts() {
        let enricher = enricher();
        enricher
            .query(QueryParams::new("/api/hr/employees/all", "get"), None)
            .unwrap();

        let report = enricher.clear_caches();
        assert_eq!(report.documents, 1);
        assert_eq!(report.digests, 1);
    }
}

mod determinism {
    use super::*;
    use formmeta::{canonicalize, digest};

    #[test]
    fn payload_digest_is_stable_across_runs() {
        let a = fresh(
            enricher()
                .query(QueryParams::new("/api/hr/employees/all", "get"), None)
                .unwrap(),
        );
        let b = fresh(
            enricher()
                .query(QueryParams::new("/api/hr/employees/all", "get"), None)
                .unwrap(),
        );
        assert_eq!(digest(&a), digest(&b));
    }

    #[test]
    fn canonical_form_independent_of_key_order() {
        let a = json!({ "controlType": "input", "label": "Name" });
        let b = json!({ "label": "Name", "controlType": "input" });
        assert_eq!(canonicalize(&a), canonicalize(&b));
        assert_eq!(digest(&a), digest(&b));
    }
}

mod errors {
    use super::*;
    use formmeta::{EnrichError, ErrorKind};

    #[test]
    fn unknown_path_is_not_found() {
        let params = QueryParams::new("/api/hr/nothing", "get");
        let err = enricher().query(params, None).unwrap_err();
        assert!(matches!(err, EnrichError::PathOperationNotFound { .. }));
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn empty_operation_is_input_error() {
        let params = QueryParams::new("/api/hr/employees/all", "  ");
        let err = enricher().query(params, None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Input);
    }

    #[test]
    fn schema_exhaustion_is_not_found() {
        let doc = json!({
            "paths": { "/api/x/things": { "get": {} } },
            "definitions": {}
        });
        let enricher = Enricher::new(StaticSource::new(doc), GroupIndex::default());
        let err = enricher
            .query(QueryParams::new("/api/x/things", "get"), None)
            .unwrap_err();
        assert!(matches!(err, EnrichError::SchemaNotFound { .. }));
    }

    #[test]
    fn missing_reference_recovered_not_fatal() {
        let doc = json!({
            "paths": {
                "/api/x/all": {
                    "get": { "x-ui-schema": "Thing" }
                }
            },
            "definitions": {
                "Thing": {
                    "type": "object",
                    "properties": {
                        "ghost": { "$ref": "#/definitions/Missing" }
                    }
                }
            }
        });
        let enricher = Enricher::new(StaticSource::new(doc), GroupIndex::default());
        let params = QueryParams::new("/api/x/all", "get").include_internal(true);
        let payload = fresh(enricher.query(params, None).unwrap());
        // The unresolved reference is left in place rather than failing.
        assert_eq!(
            payload["schema"]["properties"]["ghost"]["$ref"],
            "#/definitions/Missing"
        );
    }
}

mod enum_thresholds {
    use super::*;

    fn document_with_enum(n: usize) -> Value {
        let values: Vec<String> = (0..n).map(|i| format!("v{i}")).collect();
        json!({
            "paths": {
                "/api/x/all": { "get": { "x-ui-schema": "Thing" } }
            },
            "definitions": {
                "Thing": {
                    "type": "object",
                    "properties": {
                        "kind": { "type": "string", "enum": values }
                    }
                }
            }
        })
    }

    fn control_for(n: usize) -> String {
        let enricher = Enricher::new(
            StaticSource::new(document_with_enum(n)),
            GroupIndex::default(),
        );
        let payload = fresh(
            enricher
                .query(QueryParams::new("/api/x/all", "get"), None)
                .unwrap(),
        );
        payload["schema"]["properties"]["kind"]["controlType"]
            .as_str()
            .unwrap()
            .to_string()
    }

    #[test]
    fn boundaries_on_both_sides() {
        assert_eq!(control_for(5), "radio");
        assert_eq!(control_for(6), "select");
        assert_eq!(control_for(25), "select");
        assert_eq!(control_for(26), "autocomplete");
    }
}

mod precedence {
    use super::*;

    fn document_with_directive(directive: Value) -> Value {
        json!({
            "paths": {
                "/api/x/all": { "get": { "x-ui-schema": "Thing" } }
            },
            "definitions": {
                "Thing": {
                    "type": "object",
                    "properties": {
                        "jobDescription": {
                            "type": "string",
                            "x-ui": directive,
                            "x-constraints": { "notBlank": true }
                        }
                    }
                }
            }
        })
    }

    fn enrich_with(directive: Value) -> Value {
        let enricher = Enricher::new(
            StaticSource::new(document_with_directive(directive)),
            GroupIndex::default(),
        );
        fresh(
            enricher
                .query(QueryParams::new("/api/x/all", "get"), None)
                .unwrap(),
        )
    }

    #[test]
    fn explicit_directive_beats_shape_and_naming() {
        // Naming says textarea; the authored directive says select.
        let payload = enrich_with(json!({ "controlType": "select" }));
        assert_eq!(
            payload["schema"]["properties"]["jobDescription"]["controlType"],
            "select"
        );
    }

    #[test]
    fn raw_overrides_beat_explicit_directive() {
        let payload = enrich_with(json!({
            "controlType": "select",
            "overrides": { "controlType": "markdown-editor", "validation.required": false }
        }));
        let prop = &payload["schema"]["properties"]["jobDescription"];
        assert_eq!(prop["controlType"], "markdown-editor");
        assert_eq!(prop["validation"]["required"], false);
    }
}
