//! Who may do what. Every protected handler asks [`authorize`] and acts on
//! the returned [`Decision`]; nothing else compares user ids for access.

use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthenticatedUser {
    pub id: Uuid,
    pub username: String,
}

/// The user making the current request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Actor {
    #[default]
    Anonymous,
    User(AuthenticatedUser),
}

impl Actor {
    pub fn user(&self) -> Option<&AuthenticatedUser> {
        match self {
            Actor::User(user) => Some(user),
            Actor::Anonymous => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Capability<'a> {
    /// Any signed-in actor; gates a page before the resource is loaded.
    SignedIn,
    CreatePost,
    EditPost { post_id: Uuid, author_id: Uuid },
    Comment,
    Follow { author_id: Uuid, username: &'a str },
    Unfollow,
    ViewFeed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Denial {
    Anonymous,
    NotAuthor { post_id: Uuid },
    SelfFollow { username: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Allow(AuthenticatedUser),
    Deny(Denial),
}

pub fn authorize(actor: &Actor, capability: Capability<'_>) -> Decision {
    let Some(user) = actor.user() else {
        return Decision::Deny(Denial::Anonymous);
    };

    match capability {
        Capability::EditPost { post_id, author_id } if author_id != user.id => {
            Decision::Deny(Denial::NotAuthor { post_id })
        }
        Capability::Follow {
            author_id,
            username,
        } if author_id == user.id => Decision::Deny(Denial::SelfFollow {
            username: username.to_string(),
        }),
        _ => Decision::Allow(user.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn actor() -> (Actor, AuthenticatedUser) {
        let user = AuthenticatedUser {
            id: Uuid::new_v4(),
            username: "leo".into(),
        };
        (Actor::User(user.clone()), user)
    }

    #[test]
    fn anonymous_is_denied_everything() {
        for capability in [
            Capability::SignedIn,
            Capability::CreatePost,
            Capability::Comment,
            Capability::Unfollow,
            Capability::ViewFeed,
        ] {
            assert_eq!(
                authorize(&Actor::Anonymous, capability),
                Decision::Deny(Denial::Anonymous)
            );
        }
    }

    #[test]
    fn only_author_may_edit() {
        let (actor, user) = actor();
        let post_id = Uuid::new_v4();
        assert_eq!(
            authorize(
                &actor,
                Capability::EditPost {
                    post_id,
                    author_id: user.id
                }
            ),
            Decision::Allow(user.clone())
        );
        assert_eq!(
            authorize(
                &actor,
                Capability::EditPost {
                    post_id,
                    author_id: Uuid::new_v4()
                }
            ),
            Decision::Deny(Denial::NotAuthor { post_id })
        );
    }

    #[test]
    fn self_follow_is_denied() {
        let (actor, user) = actor();
        assert_eq!(
            authorize(
                &actor,
                Capability::Follow {
                    author_id: user.id,
                    username: "leo"
                }
            ),
            Decision::Deny(Denial::SelfFollow {
                username: "leo".into()
            })
        );
        assert!(matches!(
            authorize(
                &actor,
                Capability::Follow {
                    author_id: Uuid::new_v4(),
                    username: "tolstoy"
                }
            ),
            Decision::Allow(_)
        ));
    }
}
