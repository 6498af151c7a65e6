//! Member management service

use crate::{
    error::AppResult,
    models::{CreateMember, Member, MemberDetails, MemberQuery, UpdateMember},
    repository::Repository,
};

use super::auth::AuthService;

#[derive(Clone)]
pub struct MembersService {
    repository: Repository,
}

impl MembersService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// List members with the total matching count for pagination
    pub async fn list(&self, query: &MemberQuery) -> AppResult<(Vec<MemberDetails>, i64)> {
        let members = self.repository.members.list(query).await?;
        let total = self.repository.members.count(query).await?;
        Ok((members, total))
    }

    pub async fn get(&self, id: i32) -> AppResult<MemberDetails> {
        self.repository.members.get_details(id).await
    }

    /// Staff-side member creation
    pub async fn create(&self, request: &CreateMember) -> AppResult<Member> {
        let hash = AuthService::hash_password(&request.password)?;
        self.repository.members.create(request, &hash).await
    }

    pub async fn update(&self, id: i32, changes: &UpdateMember) -> AppResult<Member> {
        self.repository.members.update(id, changes).await
    }

    /// Deactivate instead of delete, keeping loan history intact
    pub async fn deactivate(&self, id: i32) -> AppResult<()> {
        self.repository.members.deactivate(id).await
    }
}
