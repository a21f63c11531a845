use super::common::*;

use crate::board::catalog::UpsertOutcome;
use crate::board::{CatalogError, JobCatalog, JobId, ValidationError};

#[test]
fn upserted_postings_are_found_by_id_until_removed() {
    let mut catalog = catalog_of(vec![design_job(), development_job()]);

    assert_eq!(catalog.by_id(&JobId::new("A")), Ok(&design_job()));
    assert_eq!(catalog.by_id(&JobId::new("B")), Ok(&development_job()));

    let removed = catalog.remove(&JobId::new("A")).expect("A is present");
    assert_eq!(removed.id, JobId::new("A"));
    assert_eq!(
        catalog.by_id(&JobId::new("A")),
        Err(CatalogError::NotFound(JobId::new("A")))
    );
    assert_eq!(catalog.by_id(&JobId::new("B")), Ok(&development_job()));
}

#[test]
fn empty_query_returns_everything_in_insertion_order() {
    let marketing = posting("C", "Marketing Manager", "GrowthCo", "Marketing");
    let catalog = catalog_of(vec![development_job(), marketing.clone(), design_job()]);

    let ids: Vec<&str> = catalog.query("", "").map(|job| job.id.as_str()).collect();
    assert_eq!(ids, vec!["B", "C", "A"]);
}

#[test]
fn category_filter_selects_exact_matches() {
    let catalog = catalog_of(vec![design_job(), development_job()]);

    let results: Vec<_> = catalog.query("", "Design").cloned().collect();
    assert_eq!(results, vec![design_job()]);
}

#[test]
fn filtered_results_are_a_subset_matching_both_predicates() {
    let catalog = catalog_of(vec![
        design_job(),
        development_job(),
        posting("C", "Marketing Manager", "GrowthCo", "Marketing"),
        posting("D", "Product Designer", "TechCorp Inc.", "Design"),
    ]);
    let everything: Vec<_> = catalog.query("", "").collect();

    for (term, category) in [
        ("design", ""),
        ("TECHCORP", ""),
        ("", "design"),
        ("corp", "Development"),
        ("manager", "Design"),
        ("  growth ", " marketing "),
    ] {
        let needle = term.trim().to_lowercase();
        let wanted = category.trim().to_lowercase();
        for job in catalog.query(term, category) {
            assert!(everything.contains(&job));
            assert!(
                job.title.to_lowercase().contains(&needle)
                    || job.company.to_lowercase().contains(&needle)
            );
            assert!(wanted.is_empty() || job.category.to_lowercase() == wanted);
        }
    }

    let ids: Vec<&str> = catalog
        .query("techcorp", "")
        .map(|job| job.id.as_str())
        .collect();
    assert_eq!(ids, vec!["B", "D"]);
    assert_eq!(catalog.query("manager", "Design").count(), 0);
}

#[test]
fn queries_reflect_the_current_state() {
    let mut catalog = catalog_of(vec![design_job()]);
    assert_eq!(catalog.query("", "Development").count(), 0);

    catalog.upsert(development_job()).expect("valid posting");
    assert_eq!(catalog.query("", "Development").count(), 1);
}

#[test]
fn upsert_of_existing_id_keeps_position() {
    let mut catalog = catalog_of(vec![design_job(), development_job()]);
    let mut renamed = design_job();
    renamed.title = "Lead Product Designer".to_string();

    assert_eq!(catalog.upsert(renamed), Ok(UpsertOutcome::Replaced));
    assert_eq!(catalog.len(), 2);

    let titles: Vec<&str> = catalog.iter().map(|job| job.title.as_str()).collect();
    assert_eq!(titles, vec!["Lead Product Designer", "Senior React Developer"]);
}

#[test]
fn blank_required_fields_are_rejected() {
    let mut catalog = JobCatalog::new();

    let mut untitled = design_job();
    untitled.title = "   ".to_string();
    assert_eq!(
        catalog.upsert(untitled),
        Err(CatalogError::Validation(ValidationError::MissingField {
            field: "title"
        }))
    );

    let mut uncategorised = design_job();
    uncategorised.category = String::new();
    assert_eq!(
        catalog.upsert(uncategorised),
        Err(CatalogError::Validation(ValidationError::MissingField {
            field: "category"
        }))
    );

    let mut no_requirements = design_job();
    no_requirements.requirements = vec![" ".to_string()];
    assert_eq!(
        catalog.upsert(no_requirements),
        Err(CatalogError::Validation(ValidationError::NoRequirements))
    );

    assert!(catalog.is_empty());
}

#[test]
fn removing_reindexes_later_postings() {
    let marketing = posting("C", "Marketing Manager", "GrowthCo", "Marketing");
    let mut catalog = catalog_of(vec![design_job(), development_job(), marketing.clone()]);

    catalog.remove(&JobId::new("A")).expect("A is present");
    assert_eq!(catalog.by_id(&JobId::new("C")), Ok(&marketing));

    let mut edited = marketing.clone();
    edited.salary = "$120k".to_string();
    catalog.upsert(edited).expect("valid posting");
    let ids: Vec<&str> = catalog.iter().map(|job| job.id.as_str()).collect();
    assert_eq!(ids, vec!["B", "C"]);

    assert_eq!(
        catalog.remove(&JobId::new("A")),
        Err(CatalogError::NotFound(JobId::new("A")))
    );
}

#[test]
fn categories_are_listed_once_in_first_seen_order() {
    let catalog = catalog_of(vec![
        development_job(),
        design_job(),
        posting("D", "Product Designer", "TechCorp Inc.", "Design"),
        posting("C", "Marketing Manager", "GrowthCo", "Marketing"),
    ]);

    assert_eq!(catalog.categories(), vec!["Development", "Design", "Marketing"]);
}
