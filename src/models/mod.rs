pub mod activity;
pub mod assignment;
pub mod common;
pub mod course;
pub mod forum;
pub mod generative_task;
pub mod ledger;
pub mod user;

pub use activity::{
    Activity, ActivityMetadata, ActivityType, NewActivityRequest, NewSectionRequest, Section,
    UpdateActivityRequest,
};
pub use assignment::{
    Assignment, AssignmentStatus, AssignmentType, GradeAssignmentRequest, NewAssignmentRequest,
    SubmissionStatus, SubmitAssignmentRequest, Submission, UpdateAssignmentRequest,
};
pub use common::{ApiResponse, Attachment, NewAttachment, NewResourceRequest, Resource};
pub use course::{Course, CourseStatus, NewCourseRequest, UpdateCourseRequest};
pub use forum::{ForumPost, ForumPostsQuery, NewPostRequest, NewReplyRequest};
pub use generative_task::{
    Difficulty, GenerateTaskRequest, GenerativeTask, GenerativeTaskSubmission, HintsQuery,
    SubmitTaskRequest, TestCase,
};
pub use ledger::{
    Enrollment, EnrollmentQuery, EnrollmentStatus, Grade, NewEnrollmentRequest,
    RecordGradeRequest, UpdateEnrollmentRequest, letter_grade,
};
pub use user::{NewUserRequest, UpdateUserRequest, User, UserProfile, UserRole};
