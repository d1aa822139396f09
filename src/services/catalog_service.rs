use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::db::catalog;
use crate::error::AppError;
use crate::ids::generate_id;
use crate::models::{
    Activity, Course, CourseStatus, NewActivityRequest, NewCourseRequest, NewResourceRequest,
    NewSectionRequest, Resource, Section, UpdateActivityRequest, UpdateCourseRequest,
};

/// Courses, their resources and the section/activity hierarchy.
pub struct CatalogService {
    db: SqlitePool,
}

impl CatalogService {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    pub async fn list_courses(&self) -> Result<Vec<Course>, AppError> {
        let courses = catalog::fetch_courses(&self.db).await?;
        debug!("loaded {} courses", courses.len());
        Ok(courses)
    }

    pub async fn get_course(&self, id: &str) -> Result<Course, AppError> {
        catalog::find_course_by_id(&self.db, id)
            .await?
            .ok_or_else(|| AppError::not_found("Course"))
    }

    pub async fn create_course(
        &self,
        instructor_id: &str,
        req: NewCourseRequest,
    ) -> Result<Course, AppError> {
        let now = Utc::now();
        let course = Course {
            id: generate_id(),
            title: req.title,
            description: req.description,
            instructor_id: instructor_id.to_string(),
            category: req.category,
            level: req.level,
            duration: req.duration,
            enrolled_students: Vec::new(),
            max_students: req.max_students,
            start_date: req.start_date,
            end_date: req.end_date,
            status: CourseStatus::Active,
            syllabus: req.syllabus,
            resources: Vec::new(),
            created_at: now,
            updated_at: now,
        };
        catalog::insert_course(&self.db, &course).await?;
        info!("created course {} ({})", course.id, course.title);
        Ok(course)
    }

    pub async fn update_course(&self, id: &str, req: UpdateCourseRequest) -> Result<Course, AppError> {
        let mut course = self.get_course(id).await?;

        if let Some(title) = req.title {
            course.title = title;
        }
        if let Some(description) = req.description {
            course.description = description;
        }
        if let Some(category) = req.category {
            course.category = category;
        }
        if let Some(level) = req.level {
            course.level = level;
        }
        if let Some(duration) = req.duration {
            course.duration = duration;
        }
        if let Some(max_students) = req.max_students {
            course.max_students = max_students;
        }
        if let Some(start_date) = req.start_date {
            course.start_date = start_date;
        }
        if let Some(end_date) = req.end_date {
            course.end_date = end_date;
        }
        if let Some(status) = req.status {
            course.status = status;
        }
        if let Some(syllabus) = req.syllabus {
            course.syllabus = syllabus;
        }
        course.updated_at = Utc::now();

        if !catalog::update_course(&self.db, &course).await? {
            return Err(AppError::not_found("Course"));
        }
        info!("updated course {}", course.id);
        Ok(course)
    }

    /// Removes only the course row; its sections, activities and resources remain.
    pub async fn delete_course(&self, id: &str) -> Result<(), AppError> {
        if !catalog::delete_course(&self.db, id).await? {
            return Err(AppError::not_found("Course"));
        }
        info!("deleted course {}", id);
        Ok(())
    }

    pub async fn add_resource(
        &self,
        course_id: &str,
        req: NewResourceRequest,
    ) -> Result<Resource, AppError> {
        self.get_course(course_id).await?;

        let resource = Resource {
            id: generate_id(),
            course_id: course_id.to_string(),
            title: req.title,
            resource_type: req.resource_type,
            url: req.url,
            description: req.description,
            uploaded_at: Utc::now(),
        };
        catalog::insert_resource(&self.db, &resource).await?;
        info!("added resource {} to course {}", resource.id, course_id);
        Ok(resource)
    }

    pub async fn list_sections(&self, course_id: &str) -> Result<Vec<Section>, AppError> {
        let sections = catalog::fetch_sections_by_course(&self.db, course_id).await?;
        debug!("course {} has {} sections", course_id, sections.len());
        Ok(sections)
    }

    pub async fn create_section(
        &self,
        course_id: &str,
        req: NewSectionRequest,
    ) -> Result<Section, AppError> {
        self.get_course(course_id).await?;

        let now = Utc::now();
        let section = Section {
            id: generate_id(),
            course_id: course_id.to_string(),
            title: req.title,
            description: req.description,
            order: req.order,
            visible: req.visible,
            activities: Vec::new(),
            created_at: now,
            updated_at: now,
        };
        catalog::insert_section(&self.db, &section).await?;
        info!("created section {} in course {}", section.id, course_id);
        Ok(section)
    }

    pub async fn get_activity(&self, id: &str) -> Result<Activity, AppError> {
        catalog::find_activity_by_id(&self.db, id)
            .await?
            .ok_or_else(|| AppError::not_found("Activity"))
    }

    pub async fn get_course_activity(
        &self,
        course_id: &str,
        activity_id: &str,
    ) -> Result<Activity, AppError> {
        catalog::find_course_activity(&self.db, course_id, activity_id)
            .await?
            .ok_or_else(|| AppError::not_found("Activity"))
    }

    pub async fn create_activity(
        &self,
        section_id: &str,
        req: NewActivityRequest,
    ) -> Result<Activity, AppError> {
        catalog::find_section_by_id(&self.db, section_id)
            .await?
            .ok_or_else(|| AppError::not_found("Section"))?;

        let now = Utc::now();
        let activity = Activity {
            id: generate_id(),
            section_id: section_id.to_string(),
            title: req.title,
            description: req.description,
            activity_type: req.activity_type,
            order: req.order,
            visible: req.visible,
            completed: false,
            due_date: req.due_date,
            available_from: req.available_from,
            available_until: req.available_until,
            metadata: req.metadata,
            created_at: now,
            updated_at: now,
        };
        catalog::insert_activity(&self.db, &activity).await?;
        info!("created {:?} activity {} in section {}", activity.activity_type, activity.id, section_id);
        Ok(activity)
    }

    pub async fn update_activity(
        &self,
        id: &str,
        req: UpdateActivityRequest,
    ) -> Result<Activity, AppError> {
        let mut activity = self.get_activity(id).await?;

        if let Some(title) = req.title {
            activity.title = title;
        }
        if let Some(description) = req.description {
            activity.description = description;
        }
        if let Some(activity_type) = req.activity_type {
            activity.activity_type = activity_type;
        }
        if let Some(order) = req.order {
            activity.order = order;
        }
        if let Some(visible) = req.visible {
            activity.visible = visible;
        }
        if let Some(completed) = req.completed {
            activity.completed = completed;
        }
        if req.due_date.is_some() {
            activity.due_date = req.due_date;
        }
        if req.available_from.is_some() {
            activity.available_from = req.available_from;
        }
        if req.available_until.is_some() {
            activity.available_until = req.available_until;
        }
        if let Some(metadata) = req.metadata {
            activity.metadata.merge(metadata);
        }
        activity.updated_at = Utc::now();

        if !catalog::update_activity(&self.db, &activity).await? {
            return Err(AppError::not_found("Activity"));
        }
        info!("updated activity {}", activity.id);
        Ok(activity)
    }

    pub async fn delete_activity(&self, id: &str) -> Result<(), AppError> {
        if !catalog::delete_activity(&self.db, id).await? {
            return Err(AppError::not_found("Activity"));
        }
        info!("deleted activity {}", id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::db::memory_pool;
    use crate::models::{ActivityMetadata, ActivityType};

    fn course_request(title: &str) -> NewCourseRequest {
        NewCourseRequest {
            title: title.to_string(),
            description: "Intro course".to_string(),
            category: "Computer Science".to_string(),
            level: "beginner".to_string(),
            duration: "12 weeks".to_string(),
            max_students: 30,
            start_date: "2025-09-01".to_string(),
            end_date: "2025-12-15".to_string(),
            syllabus: vec!["Week 1: basics".to_string()],
        }
    }

    fn activity_request(title: &str, order: i64) -> NewActivityRequest {
        NewActivityRequest {
            title: title.to_string(),
            description: String::new(),
            activity_type: ActivityType::Quiz,
            order,
            visible: true,
            due_date: Some("2025-10-01".to_string()),
            available_from: None,
            available_until: None,
            metadata: serde_json::from_value(json!({ "points": 10, "rubric": "strict" })).unwrap(),
        }
    }

    async fn service() -> CatalogService {
        CatalogService::new(memory_pool().await.unwrap())
    }

    #[tokio::test]
    async fn test_create_course_initializes_collections() {
        let service = service().await;
        let course = service.create_course("professor-1", course_request("CS101")).await.unwrap();

        assert_eq!(course.id.len(), 32);
        assert_eq!(course.status, CourseStatus::Active);
        assert!(course.enrolled_students.is_empty());
        assert!(course.resources.is_empty());

        let stored = service.get_course(&course.id).await.unwrap();
        assert_eq!(stored.title, "CS101");
        assert_eq!(stored.syllabus, vec!["Week 1: basics".to_string()]);
        assert_eq!(stored.instructor_id, "professor-1");
    }

    #[tokio::test]
    async fn test_partial_course_update_keeps_omitted_fields() {
        let service = service().await;
        let course = service.create_course("professor-1", course_request("CS101")).await.unwrap();

        let updated = service
            .update_course(
                &course.id,
                UpdateCourseRequest {
                    title: Some("CS102".to_string()),
                    max_students: Some(45),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.title, "CS102");
        assert_eq!(updated.max_students, 45);
        assert_eq!(updated.description, course.description);
        assert_eq!(updated.category, course.category);
        assert_eq!(updated.start_date, course.start_date);
        assert!(updated.updated_at >= course.updated_at);

        let stored = service.get_course(&course.id).await.unwrap();
        assert_eq!(stored.title, "CS102");
        assert_eq!(stored.level, "beginner");
    }

    #[tokio::test]
    async fn test_missing_course_is_not_found() {
        let service = service().await;
        let err = service.get_course("missing").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));

        let err = service
            .update_course("missing", UpdateCourseRequest::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));

        let err = service.delete_course("missing").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_course_delete_leaves_sections_behind() {
        let service = service().await;
        let course = service.create_course("professor-1", course_request("CS101")).await.unwrap();
        let section = service
            .create_section(
                &course.id,
                NewSectionRequest {
                    title: "Week 1".to_string(),
                    description: String::new(),
                    order: 1,
                    visible: true,
                },
            )
            .await
            .unwrap();

        service.delete_course(&course.id).await.unwrap();

        let sections = service.list_sections(&course.id).await.unwrap();
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].id, section.id);
    }

    #[tokio::test]
    async fn test_sections_list_activities_in_order() {
        let service = service().await;
        let course = service.create_course("professor-1", course_request("CS101")).await.unwrap();
        let section = service
            .create_section(
                &course.id,
                NewSectionRequest {
                    title: "Week 1".to_string(),
                    description: String::new(),
                    order: 1,
                    visible: true,
                },
            )
            .await
            .unwrap();

        service.create_activity(&section.id, activity_request("second", 2)).await.unwrap();
        service.create_activity(&section.id, activity_request("first", 1)).await.unwrap();

        let sections = service.list_sections(&course.id).await.unwrap();
        let titles: Vec<&str> = sections[0].activities.iter().map(|a| a.title.as_str()).collect();
        assert_eq!(titles, vec!["first", "second"]);
    }

    #[tokio::test]
    async fn test_create_under_missing_parent_is_not_found() {
        let service = service().await;
        let err = service
            .create_section(
                "missing",
                NewSectionRequest {
                    title: "Week 1".to_string(),
                    description: String::new(),
                    order: 1,
                    visible: false,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(ref e) if e == "Course"));

        let err = service
            .create_activity("missing", activity_request("quiz", 1))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(ref e) if e == "Section"));
    }

    #[tokio::test]
    async fn test_activity_partial_update_merges_metadata() {
        let service = service().await;
        let course = service.create_course("professor-1", course_request("CS101")).await.unwrap();
        let section = service
            .create_section(
                &course.id,
                NewSectionRequest {
                    title: "Week 1".to_string(),
                    description: String::new(),
                    order: 1,
                    visible: true,
                },
            )
            .await
            .unwrap();
        let activity = service.create_activity(&section.id, activity_request("quiz", 1)).await.unwrap();

        let patch: ActivityMetadata =
            serde_json::from_value(json!({ "timeLimit": 45, "color": "blue" })).unwrap();
        let updated = service
            .update_activity(
                &activity.id,
                UpdateActivityRequest {
                    completed: Some(true),
                    metadata: Some(patch),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert!(updated.completed);
        assert_eq!(updated.title, "quiz");
        assert_eq!(updated.due_date.as_deref(), Some("2025-10-01"));

        let stored = service.get_activity(&activity.id).await.unwrap();
        assert_eq!(stored.metadata.points, Some(10));
        assert_eq!(stored.metadata.time_limit, Some(45));
        assert_eq!(stored.metadata.extra.get("rubric"), Some(&json!("strict")));
        assert_eq!(stored.metadata.extra.get("color"), Some(&json!("blue")));
    }

    #[tokio::test]
    async fn test_course_activity_requires_matching_course() {
        let service = service().await;
        let course = service.create_course("professor-1", course_request("CS101")).await.unwrap();
        let other = service.create_course("professor-1", course_request("CS102")).await.unwrap();
        let section = service
            .create_section(
                &course.id,
                NewSectionRequest {
                    title: "Week 1".to_string(),
                    description: String::new(),
                    order: 1,
                    visible: true,
                },
            )
            .await
            .unwrap();
        let activity = service.create_activity(&section.id, activity_request("quiz", 1)).await.unwrap();

        let found = service.get_course_activity(&course.id, &activity.id).await.unwrap();
        assert_eq!(found.id, activity.id);

        let err = service.get_course_activity(&other.id, &activity.id).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_resources_are_attached_to_course() {
        let service = service().await;
        let course = service.create_course("professor-1", course_request("CS101")).await.unwrap();
        service
            .add_resource(
                &course.id,
                NewResourceRequest {
                    title: "Slides".to_string(),
                    resource_type: "pdf".to_string(),
                    url: "https://example.com/slides.pdf".to_string(),
                    description: String::new(),
                },
            )
            .await
            .unwrap();

        let courses = service.list_courses().await.unwrap();
        assert_eq!(courses.len(), 1);
        assert_eq!(courses[0].resources.len(), 1);
        assert_eq!(courses[0].resources[0].title, "Slides");
    }

    #[tokio::test]
    async fn test_delete_activity() {
        let service = service().await;
        let course = service.create_course("professor-1", course_request("CS101")).await.unwrap();
        let section = service
            .create_section(
                &course.id,
                NewSectionRequest {
                    title: "Week 1".to_string(),
                    description: String::new(),
                    order: 1,
                    visible: true,
                },
            )
            .await
            .unwrap();
        let activity = service.create_activity(&section.id, activity_request("quiz", 1)).await.unwrap();

        service.delete_activity(&activity.id).await.unwrap();
        let err = service.get_activity(&activity.id).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
        assert!(service.delete_activity(&activity.id).await.is_err());
    }
}
