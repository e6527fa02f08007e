use anyhow::anyhow;
use sqlx::PgPool;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use learnsmart_core::{AppError, FileStorage};
use learnsmart_models::{
    CreateModuleDto, DeleteModuleResponse, Module, ModuleWithCounts, UpdateModuleDto,
};

use super::ordering::{
    ModulePosition, plan_insert, plan_move, plan_remove, plan_reorder, plan_updates,
};
use crate::metrics::track_module_renumber;
use crate::utils::files::remove_stored_files;

const MODULE_COLUMNS: &str = "id, course_id, title, description, order_index, prerequisite_module_id,
     created_at, updated_at";

const MODULE_WITH_COUNTS_SELECT: &str = "SELECT m.id, m.course_id, m.title, m.description,
        m.order_index, m.prerequisite_module_id,
        (SELECT COUNT(*) FROM course_materials cm WHERE cm.module_id = m.id) AS material_count,
        (SELECT COUNT(*) FROM quizzes q WHERE q.module_id = m.id) AS quiz_count,
        m.created_at, m.updated_at
     FROM modules m";

pub struct ModuleService;

impl ModuleService {
    async fn positions(db: &PgPool, course_id: Uuid) -> Result<Vec<ModulePosition>, AppError> {
        let rows = sqlx::query_as::<_, ModulePosition>(
            "SELECT id, order_index, prerequisite_module_id FROM modules
             WHERE course_id = $1
             ORDER BY order_index, created_at, id",
        )
        .bind(course_id)
        .fetch_all(db)
        .await?;
        Ok(rows)
    }

    /// Writes the planned positions one row at a time. A failed row is
    /// logged and skipped; the next renumber of the course repairs it.
    async fn apply_order(
        db: &PgPool,
        operation: &'static str,
        rows: &[ModulePosition],
        final_order: &[Uuid],
    ) -> usize {
        let updates = plan_updates(rows, final_order);
        let mut failed = 0;

        for update in &updates {
            let result = sqlx::query(
                "UPDATE modules SET order_index = $1, prerequisite_module_id = $2,
                        updated_at = NOW()
                 WHERE id = $3",
            )
            .bind(update.order_index)
            .bind(update.prerequisite_module_id)
            .bind(update.id)
            .execute(db)
            .await;

            if let Err(e) = result {
                failed += 1;
                warn!(
                    module_id = %update.id,
                    order_index = update.order_index,
                    error = %e,
                    "Failed to renumber module"
                );
            }
        }

        track_module_renumber(operation, updates.len() - failed, failed);
        updates.len() - failed
    }

    async fn fetch_module(db: &PgPool, id: Uuid) -> Result<Module, AppError> {
        sqlx::query_as::<_, Module>(&format!("SELECT {MODULE_COLUMNS} FROM modules WHERE id = $1"))
            .bind(id)
            .fetch_optional(db)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow!("Module not found")))
    }

    #[instrument(skip(db))]
    pub async fn list_modules(
        db: &PgPool,
        course_id: Uuid,
    ) -> Result<Vec<ModuleWithCounts>, AppError> {
        let modules = sqlx::query_as::<_, ModuleWithCounts>(&format!(
            "{MODULE_WITH_COUNTS_SELECT}
             WHERE m.course_id = $1
             ORDER BY m.order_index, m.created_at, m.id"
        ))
        .bind(course_id)
        .fetch_all(db)
        .await?;
        Ok(modules)
    }

    #[instrument(skip(db))]
    pub async fn get_module(db: &PgPool, id: Uuid) -> Result<ModuleWithCounts, AppError> {
        sqlx::query_as::<_, ModuleWithCounts>(&format!(
            "{MODULE_WITH_COUNTS_SELECT} WHERE m.id = $1"
        ))
        .bind(id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found(anyhow!("Module not found")))
    }

    /// Inserts a module at the requested position and shifts the modules
    /// at or after it down by one.
    #[instrument(skip(db, dto), fields(title = %dto.title))]
    pub async fn create_module(
        db: &PgPool,
        course_id: Uuid,
        dto: CreateModuleDto,
    ) -> Result<Module, AppError> {
        let current: Vec<Uuid> = Self::positions(db, course_id)
            .await?
            .into_iter()
            .map(|p| p.id)
            .collect();
        let index = dto
            .order_index
            .map_or(current.len(), |i| usize::try_from(i).unwrap_or(0).min(current.len()));

        let module = sqlx::query_as::<_, Module>(&format!(
            "INSERT INTO modules (course_id, title, description, order_index)
             VALUES ($1, $2, $3, $4)
             RETURNING {MODULE_COLUMNS}"
        ))
        .bind(course_id)
        .bind(dto.title.trim())
        .bind(&dto.description)
        .bind(i32::try_from(index).unwrap_or(i32::MAX))
        .fetch_one(db)
        .await?;

        let final_order = plan_insert(&current, module.id, dto.order_index);
        let rows = Self::positions(db, course_id).await?;
        Self::apply_order(db, "insert", &rows, &final_order).await;

        info!(module_id = %module.id, course_id = %course_id, "Module created");

        Self::fetch_module(db, module.id).await
    }

    #[instrument(skip(db, dto))]
    pub async fn update_module(
        db: &PgPool,
        module: Module,
        dto: UpdateModuleDto,
    ) -> Result<Module, AppError> {
        let updated = sqlx::query_as::<_, Module>(&format!(
            "UPDATE modules SET
                title = COALESCE($1, title),
                description = COALESCE($2, description),
                updated_at = NOW()
             WHERE id = $3
             RETURNING {MODULE_COLUMNS}"
        ))
        .bind(dto.title.as_deref().map(str::trim))
        .bind(&dto.description)
        .bind(module.id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found(anyhow!("Module not found")))?;

        let Some(index) = dto.order_index else {
            return Ok(updated);
        };
        if index == module.order_index {
            return Ok(updated);
        }

        let rows = Self::positions(db, module.course_id).await?;
        let current: Vec<Uuid> = rows.iter().map(|p| p.id).collect();
        if let Some(final_order) = plan_move(&current, module.id, index) {
            Self::apply_order(db, "move", &rows, &final_order).await;
        }

        Self::fetch_module(db, module.id).await
    }

    /// Puts the course's modules in exactly the order given.
    #[instrument(skip(db))]
    pub async fn reorder_modules(
        db: &PgPool,
        course_id: Uuid,
        module_ids: &[Uuid],
    ) -> Result<Vec<ModuleWithCounts>, AppError> {
        let rows = Self::positions(db, course_id).await?;
        let current: Vec<Uuid> = rows.iter().map(|p| p.id).collect();
        let final_order = plan_reorder(&current, module_ids).map_err(AppError::bad_request)?;

        Self::apply_order(db, "reorder", &rows, &final_order).await;

        Self::list_modules(db, course_id).await
    }

    /// Deletes a module. A module that still has materials or quizzes is
    /// only deleted with `cascade`, which takes its content along.
    #[instrument(skip(db, storage))]
    pub async fn delete_module(
        db: &PgPool,
        storage: &dyn FileStorage,
        module: Module,
        cascade: bool,
    ) -> Result<DeleteModuleResponse, AppError> {
        let (materials, quizzes) = sqlx::query_as::<_, (i64, i64)>(
            "SELECT
                (SELECT COUNT(*) FROM course_materials WHERE module_id = $1),
                (SELECT COUNT(*) FROM quizzes WHERE module_id = $1)",
        )
        .bind(module.id)
        .fetch_one(db)
        .await?;

        if (materials > 0 || quizzes > 0) && !cascade {
            return Err(AppError::conflict(anyhow!(
                "Module has {} materials and {} quizzes; delete with cascade=true to remove them",
                materials,
                quizzes
            )));
        }

        let file_paths = sqlx::query_scalar::<_, String>(
            "SELECT file_path FROM course_materials
             WHERE module_id = $1 AND file_path IS NOT NULL",
        )
        .bind(module.id)
        .fetch_all(db)
        .await?;
        remove_stored_files(storage, file_paths).await;

        let mut tx = db.begin().await?;

        let deleted_materials = sqlx::query("DELETE FROM course_materials WHERE module_id = $1")
            .bind(module.id)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        let deleted_quizzes = sqlx::query("DELETE FROM quizzes WHERE module_id = $1")
            .bind(module.id)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        sqlx::query("DELETE FROM modules WHERE id = $1")
            .bind(module.id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        let rows = Self::positions(db, module.course_id).await?;
        let current: Vec<Uuid> = rows.iter().map(|p| p.id).collect();
        let final_order = plan_remove(&current, module.id);
        Self::apply_order(db, "remove", &rows, &final_order).await;

        info!(
            module_id = %module.id,
            deleted_materials,
            deleted_quizzes,
            "Module deleted"
        );

        Ok(DeleteModuleResponse {
            deleted_materials: deleted_materials as i64,
            deleted_quizzes: deleted_quizzes as i64,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use learnsmart_core::LocalFileStorage;
    use tempfile::TempDir;

    use crate::utils::test_helpers::insert_course;

    fn create_dto(title: &str, order_index: Option<i32>) -> CreateModuleDto {
        CreateModuleDto {
            title: title.to_string(),
            description: None,
            order_index,
        }
    }

    fn assert_chain(modules: &[ModuleWithCounts]) {
        for (i, module) in modules.iter().enumerate() {
            assert_eq!(module.order_index, i as i32);
            let expected = if i == 0 { None } else { Some(modules[i - 1].id) };
            assert_eq!(module.prerequisite_module_id, expected);
        }
    }

    fn titles(modules: &[ModuleWithCounts]) -> Vec<&str> {
        modules.iter().map(|m| m.title.as_str()).collect()
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_create_inserts_and_shifts(pool: PgPool) {
        let course_id = insert_course(&pool, "Course", None).await;
        ModuleService::create_module(&pool, course_id, create_dto("A", None))
            .await
            .unwrap();
        ModuleService::create_module(&pool, course_id, create_dto("C", None))
            .await
            .unwrap();
        let b = ModuleService::create_module(&pool, course_id, create_dto("B", Some(1)))
            .await
            .unwrap();
        assert_eq!(b.order_index, 1);

        ModuleService::create_module(&pool, course_id, create_dto("Z", Some(50)))
            .await
            .unwrap();

        let modules = ModuleService::list_modules(&pool, course_id).await.unwrap();
        assert_eq!(titles(&modules), vec!["A", "B", "C", "Z"]);
        assert_chain(&modules);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_update_moves_module(pool: PgPool) {
        let course_id = insert_course(&pool, "Course", None).await;
        let a = ModuleService::create_module(&pool, course_id, create_dto("A", None))
            .await
            .unwrap();
        ModuleService::create_module(&pool, course_id, create_dto("B", None))
            .await
            .unwrap();
        ModuleService::create_module(&pool, course_id, create_dto("C", None))
            .await
            .unwrap();

        let moved = ModuleService::update_module(
            &pool,
            a,
            UpdateModuleDto {
                title: Some("A2".to_string()),
                order_index: Some(10),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(moved.order_index, 2);
        assert_eq!(moved.title, "A2");

        let modules = ModuleService::list_modules(&pool, course_id).await.unwrap();
        assert_eq!(titles(&modules), vec!["B", "C", "A2"]);
        assert_chain(&modules);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_reorder(pool: PgPool) {
        let course_id = insert_course(&pool, "Course", None).await;
        let mut ids = Vec::new();
        for title in ["A", "B", "C"] {
            let m = ModuleService::create_module(&pool, course_id, create_dto(title, None))
                .await
                .unwrap();
            ids.push(m.id);
        }

        let reversed: Vec<Uuid> = ids.iter().rev().copied().collect();
        let modules = ModuleService::reorder_modules(&pool, course_id, &reversed)
            .await
            .unwrap();
        assert_eq!(titles(&modules), vec!["C", "B", "A"]);
        assert_chain(&modules);

        let err = ModuleService::reorder_modules(&pool, course_id, &ids[..2])
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_delete_requires_cascade_for_content(pool: PgPool) {
        let dir = TempDir::new().unwrap();
        let storage = LocalFileStorage::new(dir.path().to_path_buf(), "/files".to_string());
        let course_id = insert_course(&pool, "Course", None).await;
        let a = ModuleService::create_module(&pool, course_id, create_dto("A", None))
            .await
            .unwrap();
        ModuleService::create_module(&pool, course_id, create_dto("B", None))
            .await
            .unwrap();

        sqlx::query(
            "INSERT INTO course_materials (module_id, course_id, title, material_type, url)
             VALUES ($1, $2, 'Link', 'link', 'https://example.com')",
        )
        .bind(a.id)
        .bind(course_id)
        .execute(&pool)
        .await
        .unwrap();

        let err = ModuleService::delete_module(&pool, &storage, a.clone(), false)
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::CONFLICT);

        let deleted = ModuleService::delete_module(&pool, &storage, a, true)
            .await
            .unwrap();
        assert_eq!(deleted.deleted_materials, 1);
        assert_eq!(deleted.deleted_quizzes, 0);

        let modules = ModuleService::list_modules(&pool, course_id).await.unwrap();
        assert_eq!(titles(&modules), vec!["B"]);
        assert_chain(&modules);
    }
}
