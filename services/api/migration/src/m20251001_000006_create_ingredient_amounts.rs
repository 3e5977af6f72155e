use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(IngredientAmounts::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(IngredientAmounts::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(IngredientAmounts::RecipeId)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(IngredientAmounts::IngredientId)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(IngredientAmounts::Amount)
                            .integer()
                            .not_null()
                            .check(Expr::col(IngredientAmounts::Amount).between(1, 32000)),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(IngredientAmounts::Table, IngredientAmounts::RecipeId)
                            .to(Recipes::Table, Recipes::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(IngredientAmounts::Table, IngredientAmounts::IngredientId)
                            .to(Ingredients::Table, Ingredients::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("uq_ingredient_amounts_recipe_ingredient")
                    .table(IngredientAmounts::Table)
                    .col(IngredientAmounts::RecipeId)
                    .col(IngredientAmounts::IngredientId)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(IngredientAmounts::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum IngredientAmounts {
    Table,
    Id,
    RecipeId,
    IngredientId,
    Amount,
}

#[derive(Iden)]
enum Recipes {
    Table,
    Id,
}

#[derive(Iden)]
enum Ingredients {
    Table,
    Id,
}
