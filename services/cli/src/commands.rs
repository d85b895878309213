//! Command handlers

use std::path::Path;

use anyhow::{Context, bail};
use auth::models::{
    AvatarUpload, LoginCredentials, PasswordChange, Profile, ProfileUpdate, Registration,
};
use auth::validation;
use common::action::Settled;
use projects::models::{Project, ProjectForm, ProjectStatus};
use tracing::info;

use crate::app::App;
use crate::cli::{Commands, ProfileArgs, ProfileCommand, ProjectsCommand};

/// Turn a rejected action into an error carrying its message
fn settled<T>(outcome: Settled<T>) -> anyhow::Result<T> {
    outcome.into_result().map_err(anyhow::Error::msg)
}

pub async fn run(app: &App, command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Login { username, password } => login(app, username, password).await,
        Commands::Register {
            username,
            email,
            password,
            confirm,
        } => {
            let registration = Registration {
                username,
                email,
                password,
                password2: confirm,
            };
            register(app, &registration).await
        }
        Commands::Logout => {
            settled(app.session.logout().await)?;
            println!("Signed out");
            Ok(())
        }
        Commands::Profile(ProfileCommand::Show) => {
            let profile = require_session(app).await?;
            print_profile(&profile);
            Ok(())
        }
        Commands::Profile(ProfileCommand::Update(args)) => update_profile(app, args).await,
        Commands::Password { old, new, confirm } => {
            let change = PasswordChange::confirmed(old, new, &confirm).map_err(anyhow::Error::msg)?;
            settled(app.session.change_password(&change).await)?;
            println!("Password changed");
            Ok(())
        }
        Commands::Avatar { file } => upload_avatar(app, &file).await,
        Commands::Users => {
            require_session(app).await?;
            for user in settled(app.projects.list_users().await)? {
                println!(
                    "{:>5}  {}  {}",
                    user.id,
                    user.username,
                    user.email.as_deref().unwrap_or("-")
                );
            }
            Ok(())
        }
        Commands::Projects(command) => run_projects(app, command).await,
    }
}

async fn login(app: &App, username: String, password: String) -> anyhow::Result<()> {
    let credentials = LoginCredentials::new(username, password);
    validation::validate_login(&credentials).map_err(anyhow::Error::msg)?;

    let user = settled(app.session.login(&credentials).await)?;
    println!("Signed in as {}", user.username);
    Ok(())
}

async fn register(app: &App, registration: &Registration) -> anyhow::Result<()> {
    validation::validate_registration(registration).map_err(anyhow::Error::msg)?;

    settled(app.session.register(registration).await)?;
    println!(
        "Account {} created, sign in to continue",
        registration.username
    );
    Ok(())
}

/// Check the stored token; an invalid one is dropped
async fn require_session(app: &App) -> anyhow::Result<Profile> {
    if app.session.session().credential().await.is_none() {
        bail!("Not signed in, run `taskdeck login` first");
    }
    settled(app.session.restore_session().await)
}

/// Start from the current profile and apply the given fields
fn profile_update(current: &Profile, args: ProfileArgs) -> ProfileUpdate {
    let mut update = ProfileUpdate::from_profile(current);
    if args.first_name.is_some() {
        update.first_name = args.first_name;
    }
    if args.last_name.is_some() {
        update.last_name = args.last_name;
    }
    if args.telegram_id.is_some() {
        update.telegram_id = args.telegram_id;
    }
    if args.telegram_notifications.is_some() {
        update.telegram_notifications_enabled = args.telegram_notifications;
    }
    if args.phone_number.is_some() {
        update.phone_number = args.phone_number;
    }
    if args.date_of_birth.is_some() {
        update.date_of_birth = args.date_of_birth;
    }
    update
}

async fn update_profile(app: &App, args: ProfileArgs) -> anyhow::Result<()> {
    if args == ProfileArgs::default() {
        bail!("Nothing to update");
    }

    let current = require_session(app).await?;
    let update = profile_update(&current, args);
    validation::validate_profile_update(&update, Some(&current)).map_err(anyhow::Error::msg)?;

    let profile = settled(app.session.update_profile(&update).await)?;
    print_profile(&profile);
    Ok(())
}

fn avatar_content_type(path: &Path) -> Option<&'static str> {
    let extension = path.extension()?.to_str()?.to_ascii_lowercase();
    match extension.as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        _ => None,
    }
}

async fn read_avatar(path: &Path) -> anyhow::Result<AvatarUpload> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("avatar")
        .to_string();

    let mut upload = AvatarUpload::new(file_name, bytes);
    if let Some(content_type) = avatar_content_type(path) {
        upload = upload.with_content_type(content_type);
    }

    validation::validate_avatar(&upload).map_err(anyhow::Error::msg)?;
    Ok(upload)
}

async fn upload_avatar(app: &App, path: &Path) -> anyhow::Result<()> {
    let upload = read_avatar(path).await?;
    require_session(app).await?;

    info!("Uploading avatar of {} bytes", upload.len());
    let profile = settled(app.session.upload_avatar_and_refresh(upload).await)?;
    println!(
        "Avatar updated: {}",
        profile.avatar.as_deref().unwrap_or("-")
    );
    Ok(())
}

async fn run_projects(app: &App, command: ProjectsCommand) -> anyhow::Result<()> {
    let user = require_session(app).await?;
    let user_id = user.id;

    match command {
        ProjectsCommand::List { sort } => {
            settled(app.projects.list().await)?;
            let projects = match sort {
                Some(key) => {
                    app.projects.set_sort_key(key).await;
                    app.projects.sorted_view().await
                }
                None => app.projects.projects().await,
            };
            print_projects(&projects, user_id);
        }
        ProjectsCommand::Create {
            name,
            description,
            participants,
            status,
        } => {
            let form = ProjectForm {
                name,
                description,
                participants,
                status,
            };
            form.validate().map_err(anyhow::Error::msg)?;
            settled(app.projects.create(&form).await)?;
            print_projects(&app.projects.projects().await, user_id);
        }
        ProjectsCommand::Update {
            id,
            name,
            description,
            participants,
            status,
        } => {
            let project = owned_project(app, id, user_id).await?;
            let form = edit_form(&project, name, description, participants, status);
            form.validate().map_err(anyhow::Error::msg)?;
            settled(app.projects.update(id, &form).await)?;
            print_projects(&app.projects.projects().await, user_id);
        }
        ProjectsCommand::Delete { id } => {
            owned_project(app, id, user_id).await?;
            settled(app.projects.delete(id).await)?;
            print_projects(&app.projects.projects().await, user_id);
        }
        ProjectsCommand::Move { active, over } => {
            settled(app.projects.list().await)?;
            app.projects.move_project(active, over).await?;
            print_projects(&app.projects.projects().await, user_id);
        }
    }

    Ok(())
}

/// Load the list and return project `id` if `user_id` owns it
async fn owned_project(app: &App, id: i64, user_id: Option<i64>) -> anyhow::Result<Project> {
    let projects = settled(app.projects.list().await)?;
    let Some(project) = projects.into_iter().find(|p| p.id == id) else {
        bail!("Project {id} not found");
    };
    if !user_id.is_some_and(|uid| project.is_owned_by(uid)) {
        bail!("Only the owner can change project {id}");
    }
    Ok(project)
}

fn edit_form(
    project: &Project,
    name: Option<String>,
    description: Option<String>,
    participants: Option<Vec<i64>>,
    status: Option<ProjectStatus>,
) -> ProjectForm {
    let mut form = ProjectForm::from_project(project);
    if let Some(name) = name {
        form.name = name;
    }
    if let Some(description) = description {
        form.description = description;
    }
    if let Some(participants) = participants {
        form.participants = participants;
    }
    if let Some(status) = status {
        form.status = status;
    }
    form
}

fn print_profile(profile: &Profile) {
    let field = |value: &Option<String>| value.clone().unwrap_or_else(|| "-".to_string());
    println!("username:      {}", profile.username);
    println!("email:         {}", field(&profile.email));
    println!("role:          {}", field(&profile.role));
    println!("first name:    {}", field(&profile.first_name));
    println!("last name:     {}", field(&profile.last_name));
    println!("phone:         {}", field(&profile.phone_number));
    println!(
        "date of birth: {}",
        profile
            .date_of_birth
            .map(|d| d.to_string())
            .unwrap_or_else(|| "-".to_string())
    );
    println!("telegram id:   {}", field(&profile.telegram_id));
    println!(
        "telegram:      {}",
        if profile.telegram_notifications_enabled {
            "on"
        } else {
            "off"
        }
    );
    println!("avatar:        {}", field(&profile.avatar));
}

fn print_projects(projects: &[Project], user_id: Option<i64>) {
    if projects.is_empty() {
        println!("No projects");
        return;
    }
    for project in projects {
        let owned = user_id.is_some_and(|uid| project.is_owned_by(uid));
        println!(
            "{:>5}{} {} [{}] owner: {}",
            project.id,
            if owned { "*" } else { " " },
            project.name,
            project.status,
            project.owner.username
        );
        if !project.description.is_empty() {
            println!("       {}", project.description);
        }
        if !project.participants.is_empty() {
            println!("       participants: {}", project.participant_names());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_avatar_content_type() {
        assert_eq!(avatar_content_type(Path::new("me.PNG")), Some("image/png"));
        assert_eq!(
            avatar_content_type(Path::new("me.jpeg")),
            Some("image/jpeg")
        );
        assert_eq!(avatar_content_type(Path::new("me")), None);
    }

    #[tokio::test]
    async fn test_read_avatar_rejects_large_file() {
        let mut file = tempfile::Builder::new().suffix(".png").tempfile().unwrap();
        file.write_all(&vec![0u8; validation::MAX_AVATAR_BYTES + 1])
            .unwrap();

        let err = read_avatar(file.path()).await.unwrap_err();
        assert_eq!(err.to_string(), "Avatar size must be under 2MB");
    }

    #[tokio::test]
    async fn test_read_avatar_sets_content_type() {
        let mut file = tempfile::Builder::new().suffix(".jpg").tempfile().unwrap();
        file.write_all(&[0xff, 0xd8, 0xff]).unwrap();

        let upload = read_avatar(file.path()).await.unwrap();
        assert_eq!(upload.content_type.as_deref(), Some("image/jpeg"));
        assert_eq!(upload.len(), 3);
    }

    #[test]
    fn test_edit_form_overrides_only_given_fields() {
        let project = sample_project();
        let form = edit_form(&project, Some("Renamed".to_string()), None, None, None);
        assert_eq!(form.name, "Renamed");
        assert_eq!(form.description, project.description);
        assert_eq!(form.participants, vec![2]);
        assert_eq!(form.status, project.status);
    }

    #[test]
    fn test_profile_update_keeps_current_fields() {
        let current = Profile {
            username: "alice".to_string(),
            first_name: Some("Alice".to_string()),
            telegram_id: Some("@alice".to_string()),
            telegram_notifications_enabled: true,
            ..Profile::default()
        };

        let update = profile_update(
            &current,
            ProfileArgs {
                phone_number: Some("5551234".to_string()),
                ..ProfileArgs::default()
            },
        );
        assert_eq!(update.phone_number.as_deref(), Some("5551234"));
        assert_eq!(update.first_name.as_deref(), Some("Alice"));
        assert_eq!(update.last_name.as_deref(), Some(""));
        assert_eq!(update.telegram_id.as_deref(), Some("@alice"));
        assert_eq!(update.telegram_notifications_enabled, Some(true));
        assert_eq!(update.date_of_birth, None);

        let unchanged = profile_update(&current, ProfileArgs::default());
        assert_eq!(unchanged, ProfileUpdate::from_profile(&current));
    }

    fn sample_project() -> Project {
        use projects::models::UserRef;
        Project {
            id: 7,
            name: "Launch".to_string(),
            description: "Ship it".to_string(),
            status: ProjectStatus::Archived,
            owner: UserRef {
                id: 1,
                username: "alice".to_string(),
                email: None,
            },
            participants: vec![UserRef {
                id: 2,
                username: "bob".to_string(),
                email: None,
            }],
        }
    }
}
