pub mod db;
pub mod models;

pub use db::CatalogDb;
pub use models::{
    Department, DocumentRecord, DocumentRow, NewDocument, NewReport, Report, ResourceType,
    Subject, User,
};

#[cfg(test)]
pub(crate) mod testutil {
    use super::models::{NewDocument, ResourceType};

    pub(crate) fn sample_document(title: &str, author_email: &str) -> NewDocument {
        NewDocument {
            url: "https://example.com/dsa.pdf".to_string(),
            year: "2".to_string(),
            branch: "Computer Science".to_string(),
            semester: "3".to_string(),
            subject: "Data Structures".to_string(),
            subjectcode: "CSPC-203".to_string(),
            r#type: ResourceType::NotesOrPpt,
            author: "A Student".to_string(),
            author_email: author_email.to_string(),
            title: title.to_string(),
            description: "Unit 1 to 4".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testutil::sample_document;
    use super::*;
    use crate::db::test::memory_pool;

    #[tokio::test]
    async fn departments_round_trip() {
        let db = CatalogDb::new(memory_pool().await);

        db.insert_department("Computer Science", "CSE").await.unwrap();
        db.insert_department("Electrical Engineering", "EE").await.unwrap();

        let all = db.list_departments().await.unwrap();
        assert_eq!(all.len(), 2);
        // Ordered by branch name
        assert_eq!(all[0].branch, "Computer Science");
    }

    #[tokio::test]
    async fn duplicate_branch_rejected() {
        let db = CatalogDb::new(memory_pool().await);

        db.insert_department("Computer Science", "CSE").await.unwrap();
        let dup = db.insert_department("Computer Science", "CS").await;
        assert!(dup.is_err());
    }

    #[tokio::test]
    async fn subject_semester_must_match_year() {
        let db = CatalogDb::new(memory_pool().await);

        // Year 2 owns semesters 3 and 4 only
        let bad = db
            .insert_subject(2, "Computer Science", 5, "OS", "CSPC-205")
            .await;
        assert!(matches!(bad, Err(crate::error::StashError::Validation(_))));

        db.insert_subject(2, "Computer Science", 3, "OS", "CSPC-205")
            .await
            .unwrap();
        db.insert_subject(2, "Computer Science", 4, "DBMS", "CSPC-206")
            .await
            .unwrap();

        assert_eq!(db.subject_count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn subject_filters_are_conjunctive() {
        let db = CatalogDb::new(memory_pool().await);

        db.insert_subject(1, "Computer Science", 1, "Maths-1", "MACI-101")
            .await
            .unwrap();
        db.insert_subject(1, "Electrical Engineering", 1, "Maths-1", "MAEI-101")
            .await
            .unwrap();
        db.insert_subject(2, "Computer Science", 3, "DSA", "CSPC-203")
            .await
            .unwrap();

        let filtered = db
            .list_subjects(Some(1), Some("Computer Science"), None)
            .await
            .unwrap();
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].subjectcode, "MACI-101");

        let all = db.list_subjects(None, None, None).await.unwrap();
        assert_eq!(all.len(), 3);
    }

    #[tokio::test]
    async fn search_matches_substring_case_insensitive() {
        let db = CatalogDb::new(memory_pool().await);

        db.insert_document(sample_document("DSA Notes", "a@nitj.ac.in"))
            .await
            .unwrap();
        let mut os = sample_document("OS Notes", "a@nitj.ac.in");
        os.subject = "Operating Systems".to_string();
        os.subjectcode = "CSPC-205".to_string();
        db.insert_document(os).await.unwrap();

        let hits = db.search("dsa").await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].title, "DSA Notes");

        // Matches subjectcode as well
        let hits = db.search("cspc").await.unwrap();
        assert_eq!(hits.len(), 2);
    }

    #[tokio::test]
    async fn duplicate_titles_are_allowed_and_ids_distinct() {
        // Title is display-only; the surrogate id is the lookup key, so two
        // documents may legitimately share a title.
        let db = CatalogDb::new(memory_pool().await);

        let first = db
            .insert_document(sample_document("X", "a@nitj.ac.in"))
            .await
            .unwrap();
        let second = db
            .insert_document(sample_document("X", "b@nitj.ac.in"))
            .await
            .unwrap();

        assert_ne!(first.id, second.id);
    }

    #[tokio::test]
    async fn filtered_listing_and_escape_hatch() {
        let db = CatalogDb::new(memory_pool().await);

        db.insert_document(sample_document("DSA Notes", "a@nitj.ac.in"))
            .await
            .unwrap();
        let mut other = sample_document("EM Notes", "a@nitj.ac.in");
        other.branch = "Electrical Engineering".to_string();
        db.insert_document(other).await.unwrap();

        let filtered = db
            .list_documents("2", "Computer Science", "Data Structures", ResourceType::NotesOrPpt)
            .await
            .unwrap();
        assert_eq!(filtered.len(), 1);

        let all = db.list_all_documents().await.unwrap();
        assert_eq!(all.len(), 2);
    }

    #[tokio::test]
    async fn records_carry_engagement_arrays() {
        let db = CatalogDb::new(memory_pool().await);

        let doc = db
            .insert_document(sample_document("DSA Notes", "a@nitj.ac.in"))
            .await
            .unwrap();

        sqlx::query("INSERT INTO votes(document_id, email, vote) VALUES(?, ?, 1)")
            .bind(doc.id)
            .bind("b@x.com")
            .execute(db.pool())
            .await
            .unwrap();

        let records = db
            .with_engagement(db.list_all_documents().await.unwrap())
            .await
            .unwrap();
        assert_eq!(records[0].upvote, vec!["b@x.com".to_string()]);
        assert!(records[0].downvote.is_empty());
        assert!(records[0].saved_users.is_empty());
    }

    #[tokio::test]
    async fn report_outlives_its_document() {
        // A report is a snapshot with its own lifecycle; removing the
        // offending document must not take the report with it.
        let db = CatalogDb::new(memory_pool().await);

        let doc = db
            .insert_document(sample_document("DSA Notes", "a@nitj.ac.in"))
            .await
            .unwrap();

        let report = db
            .insert_report(NewReport {
                title: doc.title.clone(),
                author: doc.author.clone(),
                author_email: doc.author_email.clone(),
                r#type: doc.r#type,
                year: doc.year.clone(),
                semester: doc.semester.clone(),
                branch: doc.branch.clone(),
                subject: doc.subject.clone(),
                subjectcode: doc.subjectcode.clone(),
                description: doc.description.clone(),
                url: doc.url.clone(),
                reporter_email: "b@x.com".to_string(),
                reporter_name: "B Student".to_string(),
                reason: "Broken link".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(report.reason, "Broken link");

        db.delete_document(doc.id, "a@nitj.ac.in").await.unwrap();
        assert!(db.get_document(doc.id).await.unwrap().is_none());

        let remaining = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM reports")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(remaining, 1);
    }

    #[tokio::test]
    async fn user_count_tracks_inserts() {
        let db = CatalogDb::new(memory_pool().await);
        assert_eq!(db.user_count().await.unwrap(), 0);

        db.insert_user("a@nitj.ac.in", "A Student").await.unwrap();
        assert_eq!(db.user_count().await.unwrap(), 1);
    }
}
