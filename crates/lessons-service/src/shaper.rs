//! Result shaping: pagination and per-caller scope annotation.

use lessons_core::context::QueryParams;
use lessons_core::models::permission::{AccessControlEntry, PermissionLevel, Protected};
use lessons_core::models::principal::Principal;
use lessons_core::models::view::Scoped;
use lessons_core::repository::{Paginated, Pagination};

use crate::config::PaginationConfig;
use crate::permissions::PermissionEvaluator;

/// Where the scope of a shaped resource comes from.
#[derive(Debug, Clone, Copy)]
pub enum ScopeSource<'a> {
    /// Already known, e.g. right after a write check passed.
    Level(PermissionLevel),
    /// Computed from the resource's access-control list.
    Acl(&'a [AccessControlEntry]),
}

#[derive(Debug, Clone, Default)]
pub struct ResultShaper {
    evaluator: PermissionEvaluator,
    limits: PaginationConfig,
}

impl ResultShaper {
    pub fn new(evaluator: PermissionEvaluator, limits: PaginationConfig) -> Self {
        Self { evaluator, limits }
    }

    /// Resolve the pagination window requested by `query`.
    ///
    /// A missing limit falls back to the configured default; any limit
    /// is capped at the configured maximum. A limit of zero is kept and
    /// yields an empty page with the full total.
    pub fn window(&self, query: &QueryParams) -> Pagination {
        let limit = query
            .limit
            .unwrap_or(self.limits.default_limit)
            .min(self.limits.max_limit);
        Pagination {
            skip: query.skip.unwrap_or(0),
            limit,
        }
    }

    /// Slice an already filtered collection.
    pub fn paginate<T>(&self, items: Vec<T>, query: &QueryParams) -> Paginated<T> {
        let Pagination { skip, limit } = self.window(query);
        let total = items.len() as u64;
        let data = items
            .into_iter()
            .skip(usize::try_from(skip).unwrap_or(usize::MAX))
            .take(usize::try_from(limit).unwrap_or(usize::MAX))
            .collect();

        Paginated {
            data,
            total,
            limit,
            skip,
        }
    }

    pub fn set_user_scope_permission<T>(
        &self,
        resource: T,
        source: ScopeSource<'_>,
        principal: &Principal,
    ) -> Scoped<T> {
        let scope = match source {
            ScopeSource::Level(level) => Some(level),
            ScopeSource::Acl(acl) => self.evaluator.scope(acl, principal),
        };
        Scoped { resource, scope }
    }

    /// Annotate every item of a page with the caller's scope and turn it
    /// into its outgoing view, which drops the access-control list.
    pub fn set_user_scope_permission_for_find_requests<R, V>(
        &self,
        page: Paginated<R>,
        principal: &Principal,
    ) -> Paginated<Scoped<V>>
    where
        R: Protected,
        V: From<R>,
    {
        page.map(|item| {
            let scope = self.evaluator.scope(item.permissions(), principal);
            Scoped {
                resource: V::from(item),
                scope,
            }
        })
    }
}
