use crate::forms::{self, LoginDraft, SignupDraft, SubmitError};
use crate::model::{SessionIdentity, User};
use crate::repo::Repository;
use crate::store::{Store, CURRENT_USER_KEY};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Page {
    Login,
    Signup,
    Dashboard,
    Students,
    Teachers,
    Attendance,
    Grades,
    Courses,
}

impl Page {
    pub fn parse(s: &str) -> Option<Self> {
        Some(match s.trim() {
            "login" => Page::Login,
            "signup" => Page::Signup,
            "dashboard" => Page::Dashboard,
            "students" => Page::Students,
            "teachers" => Page::Teachers,
            "attendance" => Page::Attendance,
            "grades" => Page::Grades,
            "courses" => Page::Courses,
            _ => return None,
        })
    }

    pub fn is_public(self) -> bool {
        matches!(self, Page::Login | Page::Signup)
    }
}

/// Header badge for the signed-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub display_name: String,
    pub initials: String,
}

impl Profile {
    pub fn for_name(name: &str) -> Self {
        let display_name = name.split(' ').next().unwrap_or("").to_string();
        let initials: String = name
            .split(' ')
            .filter_map(|part| part.chars().next())
            .flat_map(char::to_uppercase)
            .take(2)
            .collect();
        Self {
            display_name,
            initials,
        }
    }
}

/// Owns the `currentUser` key; nothing else reads or writes it.
pub struct SessionController {
    store: Store,
    current: Option<SessionIdentity>,
    page: Page,
}

impl SessionController {
    pub fn load(store: Store) -> Self {
        let current: Option<SessionIdentity> = store.load_or(CURRENT_USER_KEY, None);
        Self {
            store,
            current,
            page: Page::Login,
        }
    }

    pub fn current_user(&self) -> Option<&SessionIdentity> {
        self.current.as_ref()
    }

    pub fn page(&self) -> Page {
        self.page
    }

    pub fn profile(&self) -> Option<Profile> {
        self.current.as_ref().map(|u| Profile::for_name(&u.name))
    }

    /// Dashboard for a restored session, login otherwise.
    pub fn initial_page(&mut self) -> Page {
        self.page = if self.current.is_some() {
            log::info!("session restored");
            Page::Dashboard
        } else {
            Page::Login
        };
        self.page
    }

    pub fn login(
        &mut self,
        users: &Repository<User>,
        draft: &LoginDraft,
    ) -> Result<SessionIdentity, SubmitError> {
        let identity = forms::check_login(users, draft)?;
        self.start(identity.clone())?;
        log::info!("user logged in: {}", identity.email);
        Ok(identity)
    }

    pub fn signup(
        &mut self,
        users: &mut Repository<User>,
        draft: SignupDraft,
    ) -> Result<SessionIdentity, SubmitError> {
        let user = forms::register_user(users, draft)?;
        let identity = SessionIdentity::from(&user);
        self.start(identity.clone())?;
        Ok(identity)
    }

    pub fn logout(&mut self) -> anyhow::Result<()> {
        self.store.remove(CURRENT_USER_KEY)?;
        self.current = None;
        self.page = Page::Login;
        log::info!("user logged out");
        Ok(())
    }

    /// Navigating to `login` logs out. Without a session every protected
    /// page resolves to `login`.
    pub fn navigate(&mut self, target: Page) -> anyhow::Result<Page> {
        if target == Page::Login {
            self.logout()?;
            return Ok(self.page);
        }
        self.page = if self.current.is_none() && !target.is_public() {
            Page::Login
        } else {
            target
        };
        Ok(self.page)
    }

    fn start(&mut self, identity: SessionIdentity) -> Result<(), SubmitError> {
        self.store.save(CURRENT_USER_KEY, &identity)?;
        self.current = Some(identity);
        self.page = Page::Dashboard;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forms::FormError;
    use crate::model::Role;

    fn users(store: &Store) -> Repository<User> {
        let mut repo = Repository::load(store.clone());
        repo.upsert(User {
            name: "Admin User".into(),
            email: "admin@college.com".into(),
            password: "password123".into(),
            role: Role::Admin,
        })
        .expect("seed admin");
        repo
    }

    fn admin_login(role: &str) -> LoginDraft {
        LoginDraft {
            email: "admin@college.com".into(),
            password: "password123".into(),
            role: role.into(),
        }
    }

    #[test]
    fn admin_login_persists_reduced_identity() {
        let store = Store::in_memory();
        let users = users(&store);
        let mut session = SessionController::load(store.clone());

        let id = session.login(&users, &admin_login("admin")).expect("login");
        assert_eq!(
            id,
            SessionIdentity {
                email: "admin@college.com".into(),
                role: Role::Admin,
                name: "Admin User".into(),
            }
        );
        assert_eq!(session.page(), Page::Dashboard);

        let raw = store.load_raw(CURRENT_USER_KEY).expect("persisted");
        let v: serde_json::Value = serde_json::from_str(&raw).expect("json");
        assert_eq!(
            v,
            serde_json::json!({ "email": "admin@college.com", "role": "admin", "name": "Admin User" })
        );
    }

    #[test]
    fn wrong_role_fails_and_stores_nothing() {
        let store = Store::in_memory();
        let users = users(&store);
        let mut session = SessionController::load(store.clone());
        for role in ["student", "teacher"] {
            let e = session.login(&users, &admin_login(role)).expect_err("role mismatch");
            assert!(matches!(e, SubmitError::Invalid(FormError::InvalidCredentials)));
        }
        assert!(session.current_user().is_none());
        assert!(store.load_raw(CURRENT_USER_KEY).is_none());
    }

    #[test]
    fn restored_session_starts_on_dashboard() {
        let store = Store::in_memory();
        let users = users(&store);
        SessionController::load(store.clone())
            .login(&users, &admin_login("admin"))
            .expect("login");

        let mut restored = SessionController::load(store);
        assert_eq!(restored.initial_page(), Page::Dashboard);
        assert_eq!(
            restored.profile(),
            Some(Profile {
                display_name: "Admin".into(),
                initials: "AU".into(),
            })
        );
    }

    #[test]
    fn logout_clears_key_and_returns_to_login() {
        let store = Store::in_memory();
        let users = users(&store);
        let mut session = SessionController::load(store.clone());
        session.login(&users, &admin_login("admin")).expect("login");

        assert_eq!(session.navigate(Page::Login).expect("nav"), Page::Login);
        assert!(session.current_user().is_none());
        assert!(store.load_raw(CURRENT_USER_KEY).is_none());
        assert_eq!(SessionController::load(store).initial_page(), Page::Login);
    }

    #[test]
    fn protected_pages_need_a_session() {
        let store = Store::in_memory();
        let users = users(&store);
        let mut session = SessionController::load(store);
        assert_eq!(session.navigate(Page::Students).expect("nav"), Page::Login);
        assert_eq!(session.navigate(Page::Signup).expect("nav"), Page::Signup);

        session.login(&users, &admin_login("admin")).expect("login");
        assert_eq!(session.navigate(Page::Grades).expect("nav"), Page::Grades);
    }

    #[test]
    fn signup_logs_the_new_user_in() {
        let store = Store::in_memory();
        let mut users = users(&store);
        let mut session = SessionController::load(store);
        let id = session
            .signup(
                &mut users,
                SignupDraft {
                    name: "Jane Smith".into(),
                    email: "jane@college.com".into(),
                    password: "secret1".into(),
                    confirm_password: "secret1".into(),
                    role: "teacher".into(),
                },
            )
            .expect("signup");
        assert_eq!(id.role, Role::Teacher);
        assert_eq!(session.page(), Page::Dashboard);
        assert_eq!(users.len(), 2);
    }

    #[test]
    fn profile_initials_cap_at_two() {
        let p = Profile::for_name("mary ann lee");
        assert_eq!(p.display_name, "mary");
        assert_eq!(p.initials, "MA");
    }
}
