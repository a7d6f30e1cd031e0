//! Lifecycle hooks - optional callbacks a model runs around persistence
//!
//! A model opts in by implementing [`Hookable`] and returning itself from
//! [`Model::as_hookable`]. Every callback defaults to a no-op. A failing hook
//! aborts the operation it guards and surfaces as `ModelError::Hook`.

use std::fmt;

use async_trait::async_trait;

use crate::error::ModelResult;
use crate::hook_error::HookError;
use crate::model::Model;

#[async_trait]
pub trait Hookable: Send + Sync {
    /// Runs before insert or update; may mutate the model
    async fn before_save(&mut self) -> Result<(), HookError> {
        Ok(())
    }

    /// Runs after a document was decoded into the model
    async fn after_find(&mut self) -> Result<(), HookError> {
        Ok(())
    }

    async fn before_delete(&mut self) -> Result<(), HookError> {
        Ok(())
    }

    async fn after_delete(&mut self) -> Result<(), HookError> {
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HookPoint {
    BeforeSave,
    AfterFind,
    BeforeDelete,
    AfterDelete,
}

impl HookPoint {
    pub fn as_str(&self) -> &'static str {
        match self {
            HookPoint::BeforeSave => "before_save",
            HookPoint::AfterFind => "after_find",
            HookPoint::BeforeDelete => "before_delete",
            HookPoint::AfterDelete => "after_delete",
        }
    }
}

impl fmt::Display for HookPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Invoke the callback for `point` if the model is hookable
pub async fn dispatch<M: Model>(model: &mut M, point: HookPoint) -> ModelResult<()> {
    let Some(hooks) = model.as_hookable() else {
        return Ok(());
    };

    let result = match point {
        HookPoint::BeforeSave => hooks.before_save().await,
        HookPoint::AfterFind => hooks.after_find().await,
        HookPoint::BeforeDelete => hooks.before_delete().await,
        HookPoint::AfterDelete => hooks.after_delete().await,
    };

    result.map_err(|err| {
        tracing::debug!(
            collection = M::collection_name(),
            hook = point.as_str(),
            error = %err,
            "lifecycle hook failed"
        );
        err.into()
    })
}

pub async fn call_before_save<M: Model>(model: &mut M) -> ModelResult<()> {
    dispatch(model, HookPoint::BeforeSave).await
}

pub async fn call_after_find<M: Model>(model: &mut M) -> ModelResult<()> {
    dispatch(model, HookPoint::AfterFind).await
}

pub async fn call_before_delete<M: Model>(model: &mut M) -> ModelResult<()> {
    dispatch(model, HookPoint::BeforeDelete).await
}

pub async fn call_after_delete<M: Model>(model: &mut M) -> ModelResult<()> {
    dispatch(model, HookPoint::AfterDelete).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ModelError;
    use crate::model::Record;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, Default, Serialize, Deserialize)]
    struct Post {
        #[serde(flatten)]
        record: Record,
        title: String,
        #[serde(skip)]
        calls: Vec<&'static str>,
    }

    #[async_trait]
    impl Hookable for Post {
        async fn before_save(&mut self) -> Result<(), HookError> {
            self.calls.push("before_save");
            if self.title.is_empty() {
                return Err(HookError::validation_with_hint(
                    "title cannot be empty",
                    "set a title before saving",
                ));
            }
            self.title = self.title.trim().to_string();
            Ok(())
        }

        async fn after_find(&mut self) -> Result<(), HookError> {
            self.calls.push("after_find");
            Ok(())
        }

        async fn before_delete(&mut self) -> Result<(), HookError> {
            self.calls.push("before_delete");
            Err(HookError::aborted("posts are permanent"))
        }
    }

    impl Model for Post {
        fn collection_name() -> &'static str {
            "posts"
        }

        fn record(&self) -> &Record {
            &self.record
        }

        fn record_mut(&mut self) -> &mut Record {
            &mut self.record
        }

        fn as_hookable(&mut self) -> Option<&mut dyn Hookable> {
            Some(self)
        }
    }

    #[derive(Debug, Clone, Default, Serialize, Deserialize)]
    struct Tag {
        #[serde(flatten)]
        record: Record,
    }

    impl Model for Tag {
        fn collection_name() -> &'static str {
            "tags"
        }

        fn record(&self) -> &Record {
            &self.record
        }

        fn record_mut(&mut self) -> &mut Record {
            &mut self.record
        }
    }

    #[tokio::test]
    async fn test_hooks_can_mutate_model() {
        let mut post = Post {
            title: "  Hello  ".to_string(),
            ..Default::default()
        };

        call_before_save(&mut post).await.unwrap();
        call_after_find(&mut post).await.unwrap();

        assert_eq!(post.title, "Hello");
        assert_eq!(post.calls, vec!["before_save", "after_find"]);
    }

    #[tokio::test]
    async fn test_hook_failure_surfaces() {
        let mut post = Post::default();
        let err = call_before_save(&mut post).await.unwrap_err();

        match err {
            ModelError::Hook(HookError::Validation { message, hint }) => {
                assert_eq!(message, "title cannot be empty");
                assert_eq!(hint.as_deref(), Some("set a title before saving"));
            }
            other => panic!("expected hook error, got {:?}", other),
        }

        let err = call_before_delete(&mut post).await.unwrap_err();
        assert_eq!(err.to_string(), "Hook error: Operation aborted: posts are permanent");
    }

    #[tokio::test]
    async fn test_default_hooks_are_noops() {
        let mut post = Post {
            title: "x".to_string(),
            ..Default::default()
        };
        call_after_delete(&mut post).await.unwrap();
        assert!(post.calls.is_empty());
    }

    #[tokio::test]
    async fn test_models_without_hooks_pass() {
        let mut tag = Tag::default();
        for point in [
            HookPoint::BeforeSave,
            HookPoint::AfterFind,
            HookPoint::BeforeDelete,
            HookPoint::AfterDelete,
        ] {
            dispatch(&mut tag, point).await.unwrap();
        }
    }

    #[test]
    fn test_hook_point_names() {
        assert_eq!(HookPoint::BeforeSave.to_string(), "before_save");
        assert_eq!(HookPoint::AfterDelete.as_str(), "after_delete");
    }
}
