use crate::domain::{Category, Tag, slugify};
use crate::error::DomainError;
use crate::policy::{Mutation, Requester, authorize};

use super::{BlogService, CategoryInput, MAX_NAME_LENGTH};

/// Trim a taxonomy name and derive its slug.
fn normalize_name(name: &str) -> Result<(String, String), DomainError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(DomainError::validation("Name is required."));
    }
    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(DomainError::validation(format!(
            "Name must be at most {MAX_NAME_LENGTH} characters."
        )));
    }
    let slug = slugify(name);
    if slug.is_empty() {
        return Err(DomainError::validation(
            "Name must contain at least one letter or digit.",
        ));
    }
    Ok((name.to_string(), slug))
}

impl BlogService {
    pub async fn list_categories(&self) -> Result<Vec<Category>, DomainError> {
        Ok(self.categories.list_all().await?)
    }

    pub async fn create_category(
        &self,
        requester: &Requester,
        input: CategoryInput,
    ) -> Result<Category, DomainError> {
        authorize(Mutation::ManageCategory, requester)?;
        let (name, slug) = normalize_name(&input.name)?;
        self.ensure_category_free(&name, &slug, None).await?;

        let mut category = Category::new(name, input.description);
        category.slug = slug;
        let category = self.categories.save(category).await?;

        tracing::info!(category_id = %category.id, slug = %category.slug, "Category created");
        Ok(category)
    }

    /// Rename or re-describe a category. The slug follows the name.
    pub async fn update_category(
        &self,
        requester: &Requester,
        slug: &str,
        input: CategoryInput,
    ) -> Result<Category, DomainError> {
        authorize(Mutation::ManageCategory, requester)?;
        let mut category = self.category_by_slug(slug).await?;
        let (name, new_slug) = normalize_name(&input.name)?;
        self.ensure_category_free(&name, &new_slug, Some(&category)).await?;

        category.name = name;
        category.slug = new_slug;
        category.description = input.description;
        Ok(self.categories.save(category).await?)
    }

    /// Delete a category. Its posts keep existing without a category.
    pub async fn delete_category(
        &self,
        requester: &Requester,
        slug: &str,
    ) -> Result<(), DomainError> {
        authorize(Mutation::ManageCategory, requester)?;
        let category = self.category_by_slug(slug).await?;

        self.categories.delete(category.id).await?;
        tracing::info!(category_id = %category.id, "Category deleted");
        Ok(())
    }

    pub async fn list_tags(&self) -> Result<Vec<Tag>, DomainError> {
        Ok(self.tags.list_all().await?)
    }

    pub async fn create_tag(&self, requester: &Requester, name: &str) -> Result<Tag, DomainError> {
        authorize(Mutation::ManageTag, requester)?;
        let (name, slug) = normalize_name(name)?;
        self.ensure_tag_free(&name, &slug, None).await?;

        let mut tag = Tag::new(name);
        tag.slug = slug;
        let tag = self.tags.save(tag).await?;

        tracing::info!(tag_id = %tag.id, slug = %tag.slug, "Tag created");
        Ok(tag)
    }

    pub async fn update_tag(
        &self,
        requester: &Requester,
        slug: &str,
        name: &str,
    ) -> Result<Tag, DomainError> {
        authorize(Mutation::ManageTag, requester)?;
        let mut tag = self.tag_by_slug(slug).await?;
        let (name, new_slug) = normalize_name(name)?;
        self.ensure_tag_free(&name, &new_slug, Some(&tag)).await?;

        tag.name = name;
        tag.slug = new_slug;
        Ok(self.tags.save(tag).await?)
    }

    /// Delete a tag. Posts only lose the link.
    pub async fn delete_tag(&self, requester: &Requester, slug: &str) -> Result<(), DomainError> {
        authorize(Mutation::ManageTag, requester)?;
        let tag = self.tag_by_slug(slug).await?;

        self.tags.delete(tag.id).await?;
        tracing::info!(tag_id = %tag.id, "Tag deleted");
        Ok(())
    }

    async fn category_by_slug(&self, slug: &str) -> Result<Category, DomainError> {
        self.categories
            .find_by_slug(slug)
            .await?
            .ok_or_else(|| DomainError::not_found("category", slug))
    }

    async fn tag_by_slug(&self, slug: &str) -> Result<Tag, DomainError> {
        self.tags
            .find_by_slug(slug)
            .await?
            .ok_or_else(|| DomainError::not_found("tag", slug))
    }

    async fn ensure_category_free(
        &self,
        name: &str,
        slug: &str,
        current: Option<&Category>,
    ) -> Result<(), DomainError> {
        let is_other = |found: &Category| current.is_none_or(|c| c.id != found.id);

        if let Some(found) = self.categories.find_by_name(name).await? {
            if is_other(&found) {
                return Err(DomainError::validation(
                    "Category with this name already exists.",
                ));
            }
        }
        if let Some(found) = self.categories.find_by_slug(slug).await? {
            if is_other(&found) {
                return Err(DomainError::validation(
                    "Category with this slug already exists.",
                ));
            }
        }
        Ok(())
    }

    async fn ensure_tag_free(
        &self,
        name: &str,
        slug: &str,
        current: Option<&Tag>,
    ) -> Result<(), DomainError> {
        let is_other = |found: &Tag| current.is_none_or(|t| t.id != found.id);

        if let Some(found) = self.tags.find_by_name(name).await? {
            if is_other(&found) {
                return Err(DomainError::validation("Tag with this name already exists."));
            }
        }
        if let Some(found) = self.tags.find_by_slug(slug).await? {
            if is_other(&found) {
                return Err(DomainError::validation("Tag with this slug already exists."));
            }
        }
        Ok(())
    }
}
