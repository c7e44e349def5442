use sqlx::PgPool;

use scf_db::models::domain::CreateDomain;
use scf_db::models::grant::CreateGrant;
use scf_db::models::member::CreateMember;
use scf_db::models::society::{CreateSociety, UpdateSociety};
use scf_db::models::status::MemberStatus;
use scf_db::repositories::{DomainRepo, GrantRepo, MemberRepo, SocietyRepo};

fn society_input(name: &str) -> CreateSociety {
    CreateSociety {
        name: name.to_string(),
        description: "Chess Club".to_string(),
        role_email: None,
    }
}

async fn seed_member(pool: &PgPool, crsid: &str) {
    MemberRepo::create(
        pool,
        &CreateMember {
            crsid: crsid.to_string(),
            preferred_name: "Ada".to_string(),
            surname: "Lovelace".to_string(),
            email: format!("{crsid}@example.test"),
            mail_handler: "forward".to_string(),
        },
        MemberStatus::Normal,
    )
    .await
    .unwrap();
}

#[sqlx::test(migrations = "./migrations")]
async fn create_update_and_find(pool: PgPool) {
    SocietyRepo::create(&pool, &society_input("chess"), MemberStatus::Normal)
        .await
        .unwrap();

    let updated = SocietyRepo::update(
        &pool,
        "chess",
        &UpdateSociety {
            description: Some("Chess Society".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap()
    .unwrap();
    assert_eq!(updated.description, "Chess Society");
    assert_eq!(updated.role_email, None);

    let found = SocietyRepo::find_by_name(&pool, "chess").await.unwrap();
    assert!(found.is_some());
}

#[sqlx::test(migrations = "./migrations")]
async fn admin_set_operations(pool: PgPool) {
    seed_member(&pool, "ab123").await;
    seed_member(&pool, "cd456").await;
    SocietyRepo::create(&pool, &society_input("chess"), MemberStatus::Normal)
        .await
        .unwrap();

    assert!(SocietyRepo::add_admin(&pool, "chess", "ab123").await.unwrap());
    assert!(SocietyRepo::add_admin(&pool, "chess", "cd456").await.unwrap());
    // adding twice reports no change
    assert!(!SocietyRepo::add_admin(&pool, "chess", "ab123").await.unwrap());

    assert!(SocietyRepo::is_admin(&pool, "chess", "ab123").await.unwrap());
    assert_eq!(
        SocietyRepo::admins(&pool, "chess").await.unwrap(),
        vec!["ab123".to_string(), "cd456".to_string()]
    );
    assert_eq!(
        SocietyRepo::administered_by(&pool, "ab123").await.unwrap(),
        vec!["chess".to_string()]
    );

    assert!(SocietyRepo::remove_admin(&pool, "chess", "cd456").await.unwrap());
    assert!(!SocietyRepo::remove_admin(&pool, "chess", "cd456").await.unwrap());
    assert!(!SocietyRepo::is_admin(&pool, "chess", "cd456").await.unwrap());
}

#[sqlx::test(migrations = "./migrations")]
async fn rename_moves_identifier_and_dependents(pool: PgPool) {
    seed_member(&pool, "ab123").await;
    SocietyRepo::create(&pool, &society_input("oldname"), MemberStatus::Normal)
        .await
        .unwrap();
    SocietyRepo::add_admin(&pool, "oldname", "ab123").await.unwrap();
    DomainRepo::create(
        &pool,
        &CreateDomain {
            owner_kind: "society".to_string(),
            owner_name: "oldname".to_string(),
            domain: "example.org".to_string(),
            docroot: None,
            wildcard: false,
        },
    )
    .await
    .unwrap();
    GrantRepo::create(
        &pool,
        &CreateGrant {
            owner_kind: "society".to_string(),
            owner_name: "oldname".to_string(),
            engine: "mysql".to_string(),
            database_name: "oldname".to_string(),
        },
    )
    .await
    .unwrap();

    let mut tx = pool.begin().await.unwrap();
    assert!(SocietyRepo::rename(&mut tx, "oldname", "newname").await.unwrap());
    tx.commit().await.unwrap();

    assert!(SocietyRepo::find_by_name(&pool, "oldname").await.unwrap().is_none());
    assert!(SocietyRepo::find_by_name(&pool, "newname").await.unwrap().is_some());

    // admin rows follow the rename via the FK cascade
    assert_eq!(
        SocietyRepo::admins(&pool, "newname").await.unwrap(),
        vec!["ab123".to_string()]
    );

    // polymorphic owner rows are rewritten
    let domains = DomainRepo::list_by_owner(&pool, "society", "newname").await.unwrap();
    assert_eq!(domains.len(), 1);
    let grants = GrantRepo::list_by_owner(&pool, "society", "newname", None).await.unwrap();
    assert_eq!(grants.len(), 1);
    // the database itself keeps its name; only ownership moves
    assert_eq!(grants[0].database_name, "oldname");

    let mut tx = pool.begin().await.unwrap();
    assert!(!SocietyRepo::rename(&mut tx, "ghost", "anything").await.unwrap());
    tx.commit().await.unwrap();
}

#[sqlx::test(migrations = "./migrations")]
async fn allocate_ids_is_stable(pool: PgPool) {
    SocietyRepo::create(&pool, &society_input("chess"), MemberStatus::Normal)
        .await
        .unwrap();

    let (uid, gid) = SocietyRepo::allocate_ids(&pool, "chess").await.unwrap();
    assert!(uid >= 50000);
    assert_eq!(uid, gid);

    let again = SocietyRepo::allocate_ids(&pool, "chess").await.unwrap();
    assert_eq!(again, (uid, gid));
}
