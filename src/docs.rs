use crate::api::employee::{EmployeePayload, EmployeeQuery};
use crate::api::payroll::{PayrollQuery, PayrollResponse, UpdateSalary};
use crate::api::project::{
    BoardColumn, CreateProject, ProjectBoard, ProjectDetail, ProjectListQuery, StatusInput,
    UpdateProject,
};
use crate::api::task::{CreateTask, PatchTask};
use crate::model::employee::Employee;
use crate::model::project::{Lifecycle, Project, ProjectStatus};
use crate::model::salary::Salary;
use crate::model::task::{Assignee, Task, TaskPriority, TaskStatus};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Workforce API",
        version = "0.1.0",
        description = r#"
## Workforce

Internal service for the people and the work of a small company.

### Key Features
- **Employees**
  - Register, update and deactivate employees; list the active ones with filters
- **Payroll**
  - Open a month to get one salary row per active employee
  - Adjust bonus and deductions while the month is open
- **Projects & Tasks**
  - Manage projects and their tasks, viewed as a three-column board

### Response Format
- JSON bodies with camelCase field names
- Errors as `{"error": "<message>"}`
"#,
    ),
    paths(
        crate::api::employee::list_employees,
        crate::api::employee::create_employee,
        crate::api::employee::get_employee,
        crate::api::employee::update_employee,
        crate::api::employee::delete_employee,

        crate::api::payroll::get_payroll,
        crate::api::payroll::update_salary,

        crate::api::project::list_projects,
        crate::api::project::create_project,
        crate::api::project::get_project,
        crate::api::project::update_project,
        crate::api::project::delete_project,
        crate::api::project::list_project_tasks,
        crate::api::project::project_board,

        crate::api::task::create_task,
        crate::api::task::update_task,
        crate::api::task::delete_task
    ),
    components(
        schemas(
            Employee,
            EmployeePayload,
            EmployeeQuery,
            Salary,
            PayrollQuery,
            PayrollResponse,
            UpdateSalary,
            Project,
            ProjectStatus,
            Lifecycle,
            StatusInput,
            CreateProject,
            UpdateProject,
            ProjectListQuery,
            ProjectDetail,
            ProjectBoard,
            BoardColumn,
            Task,
            TaskPriority,
            TaskStatus,
            Assignee,
            CreateTask,
            PatchTask
        )
    ),
    tags(
        (name = "Employee", description = "Employee registry"),
        (name = "Payroll", description = "Monthly payroll"),
        (name = "Project", description = "Projects and their boards"),
        (name = "Task", description = "Project tasks"),
    )
)]
pub struct ApiDoc;
