use form_collection_dom::{attributes, index, rows, Error};
use wasm_bindgen_test::{wasm_bindgen_test, wasm_bindgen_test_configure};

wasm_bindgen_test_configure!(run_in_browser);

use web_fixture_::{prototype, Fixture, TOKEN};

#[wasm_bindgen_test]
fn add_to_empty() {
	let fixture = Fixture::new(0);
	let prototype = prototype(&fixture.prefix);

	let first = rows::add(&fixture.collection, TOKEN, &prototype).unwrap();
	assert_eq!(index::index_of(&first).unwrap(), 0);
	fixture.mark(0, "first");

	let second = rows::add(&fixture.collection, TOKEN, &prototype).unwrap();
	assert_eq!(index::index_of(&second).unwrap(), 1);

	assert_eq!(fixture.indices(), [0, 1]);
	assert_eq!(fixture.marks(), ["first", ""]);
	assert_eq!(fixture.rows()[1], second);
	fixture.assert_consistent();
}

#[wasm_bindgen_test]
fn delete_middle() {
	let fixture = Fixture::new(3);
	fixture.mark(0, "a");
	fixture.mark(1, "b");
	fixture.mark(2, "c");
	let last = fixture.row(2);

	rows::delete(&fixture.collection, &fixture.row(1)).unwrap();

	assert_eq!(fixture.indices(), [0, 1]);
	assert_eq!(fixture.marks(), ["a", "c"]);
	assert_eq!(last.id(), format!("{}_rows_1", fixture.prefix));
	assert_eq!(last.get_attribute(attributes::FULL_NAME).unwrap(), format!("{}[rows][1]", fixture.prefix));
	fixture.assert_consistent();
}

#[wasm_bindgen_test]
fn delete_only_row() {
	let fixture = Fixture::new(1);
	rows::delete(&fixture.collection, &fixture.row(0)).unwrap();
	assert!(fixture.rows().is_empty());
	assert_eq!(rows::last_index(&fixture.collection).unwrap(), None);
}

#[wasm_bindgen_test]
fn insert_in_the_middle() {
	let fixture = Fixture::new(2);
	fixture.mark(0, "a");
	fixture.mark(1, "b");

	let new_row = rows::insert(&fixture.collection, TOKEN, &prototype(&fixture.prefix), 1).unwrap();

	assert_eq!(index::index_of(&new_row).unwrap(), 1);
	assert_eq!(fixture.rows()[1], new_row);
	assert_eq!(fixture.marks(), ["a", "", "b"]);
	fixture.assert_consistent();
}

#[wasm_bindgen_test]
fn insert_at_the_end_goes_before_the_add_button() {
	let fixture = Fixture::new(2);

	let new_row = rows::insert(&fixture.collection, TOKEN, &prototype(&fixture.prefix), 2).unwrap();

	assert_eq!(fixture.rows()[2], new_row);
	assert_eq!(new_row.next_element_sibling(), Some(fixture.add_button().into()));
	fixture.assert_consistent();
}

#[wasm_bindgen_test]
fn insert_beyond_the_end_fails_without_changes() {
	let fixture = Fixture::new(2);

	assert_eq!(
		rows::insert(&fixture.collection, TOKEN, &prototype(&fixture.prefix), 3).unwrap_err(),
		Error::PositionOutOfRange { position: 3, len: 2 }
	);
	assert_eq!(fixture.indices(), [0, 1]);
}

#[wasm_bindgen_test]
fn move_boundaries_are_no_ops() {
	let fixture = Fixture::new(3);
	fixture.mark(0, "a");
	fixture.mark(2, "c");

	assert!(!rows::move_up(&fixture.collection, &fixture.row(0)).unwrap());
	assert!(!rows::move_down(&fixture.collection, &fixture.row(2)).unwrap());

	assert_eq!(fixture.marks(), ["a", "", "c"]);
	fixture.assert_consistent();
}

#[wasm_bindgen_test]
fn move_up_then_down_restores_order() {
	let fixture = Fixture::new(3);
	fixture.mark(0, "a");
	fixture.mark(1, "b");
	fixture.mark(2, "c");
	let b = fixture.row(1);

	assert!(rows::move_up(&fixture.collection, &b).unwrap());
	assert_eq!(fixture.marks(), ["b", "a", "c"]);
	assert_eq!(index::index_of(&b).unwrap(), 0);
	fixture.assert_consistent();

	assert!(rows::move_down(&fixture.collection, &b).unwrap());
	assert_eq!(fixture.marks(), ["a", "b", "c"]);
	assert_eq!(index::index_of(&b).unwrap(), 1);
	fixture.assert_consistent();
}

#[wasm_bindgen_test]
fn move_down_then_up_restores_order() {
	let fixture = Fixture::new(2);
	fixture.mark(0, "a");
	fixture.mark(1, "b");
	let a = fixture.row(0);

	assert!(rows::move_down(&fixture.collection, &a).unwrap());
	assert_eq!(fixture.marks(), ["b", "a"]);
	assert!(rows::move_up(&fixture.collection, &a).unwrap());
	assert_eq!(fixture.marks(), ["a", "b"]);
	fixture.assert_consistent();
}

#[wasm_bindgen_test]
fn duplicate_places_a_renumbered_copy_after_the_original() {
	let fixture = Fixture::new(3);
	fixture.mark(0, "a");
	fixture.mark(1, "b");
	fixture.mark(2, "c");
	let original = fixture.row(1);

	let copy = rows::duplicate(&fixture.collection, &original).unwrap();

	assert_eq!(fixture.rows().len(), 4);
	assert_eq!(fixture.rows()[2], copy);
	assert_eq!(fixture.marks(), ["a", "b", "b", "c"]);
	assert_eq!(index::index_of(&original).unwrap(), 1);
	assert_eq!(index::index_of(&copy).unwrap(), 2);

	// Identical apart from index-derived strings.
	let normalized = copy.outer_html().replace(&format!("{}_rows_2", fixture.prefix), &format!("{}_rows_1", fixture.prefix)).replace(
		&format!("{}[rows][2]", fixture.prefix),
		&format!("{}[rows][1]", fixture.prefix),
	);
	let normalized = normalized.replace(r#"data-collection-index="2""#, r#"data-collection-index="1""#).replace(
		r#"<span data-collection="node-index">2</span>"#,
		r#"<span data-collection="node-index">1</span>"#,
	);
	assert_eq!(normalized, original.outer_html());

	fixture.assert_consistent();
}

#[wasm_bindgen_test]
fn duplicate_last() {
	let fixture = Fixture::new(2);
	let copy = rows::duplicate(&fixture.collection, &fixture.row(1)).unwrap();
	assert_eq!(fixture.rows()[2], copy);
	fixture.assert_consistent();
}

#[wasm_bindgen_test]
fn renumber_rewrites_only_the_trailing_segment() {
	let fixture = Fixture::new(0);
	fixture
		.collection
		.insert_adjacent_html(
			"afterbegin",
			r#"<div id="form_rows_1_children_1" data-collection="node" data-collection-index="1" data-full-name="form[rows][1][children][1]"><input id="form_rows_1_children_1_x" name="form[rows][1][children][1][x]"></div>"#,
		)
		.unwrap();
	let row = fixture.row(0);

	assert_eq!(index::renumber(&row, 1).unwrap(), 2);

	assert_eq!(row.id(), "form_rows_1_children_2");
	assert_eq!(row.get_attribute(attributes::FULL_NAME).unwrap(), "form[rows][1][children][2]");
	let input = row.query_selector("input").unwrap().unwrap();
	assert_eq!(input.id(), "form_rows_1_children_2_x");
	assert_eq!(input.get_attribute("name").unwrap(), "form[rows][1][children][2][x]");
}

#[wasm_bindgen_test]
fn renumber_without_id_or_full_name() {
	let fixture = Fixture::new(0);
	fixture
		.collection
		.insert_adjacent_html("afterbegin", r#"<div data-collection="node" data-collection-index="0"><b data-collection="node-index">0</b></div>"#)
		.unwrap();
	let row = fixture.row(0);

	assert_eq!(index::renumber(&row, 3).unwrap(), 3);
	assert!(!row.has_attribute("id"));
	assert!(!row.has_attribute(attributes::FULL_NAME));
	assert_eq!(row.query_selector("b").unwrap().unwrap().text_content().unwrap(), "3");
	assert_eq!(index::renumber(&row, -4).unwrap_err(), Error::IndexOutOfRange { index: 3, delta: -4 });
	assert_eq!(index::index_of(&row).unwrap(), 3);
}

#[wasm_bindgen_test]
fn malformed_index_aborts_before_any_change() {
	let fixture = Fixture::new(3);
	fixture.row(2).set_attribute(attributes::INDEX, "two").unwrap();
	let html = fixture.collection.inner_html();

	assert_eq!(
		rows::delete(&fixture.collection, &fixture.row(0)).unwrap_err(),
		Error::InvalidIndex { value: Some("two".to_owned()) }
	);
	assert_eq!(fixture.collection.inner_html(), html);
}

#[wasm_bindgen_test]
fn rows_of_other_collections_are_rejected() {
	let fixture = Fixture::new(1);
	let other = Fixture::new(1);

	assert!(matches!(rows::delete(&fixture.collection, &other.row(0)), Err(Error::Resolution(_))));
	assert_eq!(other.indices(), [0]);
}

#[wasm_bindgen_test]
fn nested_collections_are_not_renumbered() {
	let fixture = Fixture::new(2);
	let outer = fixture.row(1);
	outer
		.insert_adjacent_html(
			"beforeend",
			&format!(
				concat!(
					r#"<div data-collection="collection">"#,
					r#"<div id="{p}_rows_1_tags_0" data-collection="node" data-collection-index="0" data-full-name="{p}[rows][1][tags][0]"><i data-collection="node-index">0</i></div>"#,
					r#"<div id="{p}_rows_1_tags_1" data-collection="node" data-collection-index="1" data-full-name="{p}[rows][1][tags][1]"><i data-collection="node-index">1</i></div>"#,
					"</div>",
				),
				p = fixture.prefix,
			),
		)
		.unwrap();

	rows::delete(&fixture.collection, &fixture.row(0)).unwrap();
	fixture.assert_consistent();

	let outer = fixture.row(0);
	let nested = outer.query_selector(attributes::COLLECTION).unwrap().unwrap();
	let tags = rows::direct_rows(&nested).unwrap();
	assert_eq!(tags.iter().map(|tag| index::index_of(tag).unwrap()).collect::<Vec<_>>(), [0, 1]);
	assert_eq!(tags[1].id(), format!("{}_rows_0_tags_1", fixture.prefix));
	assert_eq!(tags[1].get_attribute(attributes::FULL_NAME).unwrap(), format!("{}[rows][0][tags][1]", fixture.prefix));
	assert_eq!(tags[0].text_content().unwrap(), "0");
	assert_eq!(tags[1].text_content().unwrap(), "1");
}

#[wasm_bindgen_test]
fn mixed_sequence_keeps_density() {
	let fixture = Fixture::new(0);
	let prototype = prototype(&fixture.prefix);

	for _ in 0..4 {
		rows::add(&fixture.collection, TOKEN, &prototype).unwrap();
	}
	rows::insert(&fixture.collection, TOKEN, &prototype, 0).unwrap();
	fixture.assert_consistent();
	rows::duplicate(&fixture.collection, &fixture.row(3)).unwrap();
	fixture.assert_consistent();
	rows::move_up(&fixture.collection, &fixture.row(5)).unwrap();
	fixture.assert_consistent();
	rows::delete(&fixture.collection, &fixture.row(2)).unwrap();
	fixture.assert_consistent();
	rows::move_down(&fixture.collection, &fixture.row(0)).unwrap();
	fixture.assert_consistent();
	assert_eq!(fixture.indices(), [0, 1, 2, 3, 4]);
}

#[wasm_bindgen_test]
fn mismatched_prototype_leaves_the_collection_untouched() {
	let fixture = Fixture::new(1);
	let html = fixture.collection.inner_html();

	assert_eq!(
		rows::add(&fixture.collection, "__x__", &prototype(&fixture.prefix)).unwrap_err(),
		Error::Template { index: 1 }
	);
	assert_eq!(
		rows::insert(&fixture.collection, "__x__", &prototype(&fixture.prefix), 0).unwrap_err(),
		Error::Template { index: 0 }
	);
	assert_eq!(fixture.collection.inner_html(), html);

	rows::add(&fixture.collection, TOKEN, &prototype(&fixture.prefix)).unwrap();
	assert_eq!(fixture.indices(), [0, 1]);
	fixture.assert_consistent();
}

#[wasm_bindgen_test]
fn prototypes_must_have_a_single_root() {
	let fixture = Fixture::new(0);
	let doubled = format!("{0}{0}", prototype(&fixture.prefix));

	assert_eq!(rows::add(&fixture.collection, TOKEN, &doubled).unwrap_err(), Error::Template { index: 0 });
	assert!(fixture.rows().is_empty());
}

#[wasm_bindgen_test]
fn insert_at_the_end_goes_after_a_trailing_row() {
	let fixture = Fixture::new(2);
	fixture.add_button().remove();

	let new_row = rows::insert(&fixture.collection, TOKEN, &prototype(&fixture.prefix), 2).unwrap();

	assert_eq!(new_row.previous_element_sibling(), Some(fixture.row(1)));
	assert_eq!(fixture.collection.last_element_child(), Some(new_row));
	fixture.assert_consistent();
}

#[wasm_bindgen_test]
fn insert_into_an_empty_collection() {
	let bare = Fixture::new(0);
	bare.add_button().remove();
	let new_row = rows::insert(&bare.collection, TOKEN, &prototype(&bare.prefix), 0).unwrap();
	assert_eq!(bare.collection.first_element_child(), Some(new_row));
	bare.assert_consistent();

	let with_button = Fixture::new(0);
	let new_row = rows::insert(&with_button.collection, TOKEN, &prototype(&with_button.prefix), 0).unwrap();
	assert_eq!(new_row.next_element_sibling(), Some(with_button.add_button().into()));
	with_button.assert_consistent();
}

#[wasm_bindgen_test]
fn delete_skips_non_row_siblings() {
	let fixture = Fixture::new(3);
	fixture.mark(0, "a");
	fixture.mark(1, "b");
	fixture.mark(2, "c");
	fixture.row(1).insert_adjacent_html("afterend", "<hr>").unwrap();

	rows::delete(&fixture.collection, &fixture.row(0)).unwrap();

	assert_eq!(fixture.marks(), ["b", "c"]);
	fixture.assert_consistent();
	let separator = fixture.collection.query_selector(":scope > hr").unwrap().unwrap();
	assert_eq!(separator.previous_element_sibling(), Some(fixture.row(0)));
	assert_eq!(separator.next_element_sibling(), Some(fixture.row(1)));
}
