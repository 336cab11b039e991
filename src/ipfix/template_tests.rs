use super::*;

fn sample_template_set() -> Vec<u8> {
    let mut buf = Vec::new();
    buf.extend_from_slice(&999u16.to_be_bytes()); // template id
    buf.extend_from_slice(&7u16.to_be_bytes()); // field count
    for (ie, len) in [(8u16, 4u16), (12, 4), (7, 2), (11, 2), (4, 1), (2, 4), (1, 4)] {
        buf.extend_from_slice(&ie.to_be_bytes());
        buf.extend_from_slice(&len.to_be_bytes());
    }
    buf
}

#[test]
fn parses_a_single_template_record() {
    let templates = parse_template_set(&sample_template_set()).unwrap();
    assert_eq!(templates.len(), 1);
    let template = &templates[0];
    assert_eq!(template.id, 999);
    assert_eq!(template.fields.len(), 7);
    assert_eq!(template.fields[0].information_element_id, 8);
    assert_eq!(template.fields[0].field_length, 4);
    assert!(template.fields.iter().all(|f| f.enterprise_number.is_none()));
}

#[test]
fn parses_an_enterprise_scoped_field() {
    let mut buf = Vec::new();
    buf.extend_from_slice(&1000u16.to_be_bytes());
    buf.extend_from_slice(&1u16.to_be_bytes());
    buf.extend_from_slice(&(0x8000u16 | 42).to_be_bytes());
    buf.extend_from_slice(&4u16.to_be_bytes());
    buf.extend_from_slice(&12345u32.to_be_bytes());

    let templates = parse_template_set(&buf).unwrap();
    let field = &templates[0].fields[0];
    assert_eq!(field.information_element_id, 42);
    assert_eq!(field.enterprise_number, Some(12345));
}

#[test]
fn cache_is_keyed_by_domain_and_template_id() {
    let cache = TemplateCache::new();
    let template_a = Template {
        id: 999,
        fields: vec![FieldSpec {
            information_element_id: 1,
            field_length: 4,
            enterprise_number: None,
        }],
    };
    let template_b = Template {
        id: 999,
        fields: vec![FieldSpec {
            information_element_id: 2,
            field_length: 2,
            enterprise_number: None,
        }],
    };

    cache.insert(1, template_a.clone()).unwrap();
    cache.insert(2, template_b.clone()).unwrap();

    assert_eq!(cache.get(1, 999).unwrap(), Some(template_a));
    assert_eq!(cache.get(2, 999).unwrap(), Some(template_b));
    assert_eq!(cache.get(3, 999).unwrap(), None);
}
