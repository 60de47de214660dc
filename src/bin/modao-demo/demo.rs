// src/bin/modao-demo/demo.rs
use crate::cli::Demo;
use anyhow::{Context, Result};
use bson::{doc, oid::ObjectId, Document};
use futures::TryStreamExt;
use modao::model::{Address, Comment, DbRef, User};
use modao::util::{now, random_digits};
use modao::{collection_name, Dao, DaoError, Entity, Page, Response, Selector, UserDao};
use mongodb::options::FindOptions;
use tracing::{info, warn};

const NAMES: [&str; 3] = ["zhe", "zhe1", "zhe2"];

fn print_docs(title: &str, docs: Vec<Document>) -> Result<()> {
    println!("== {} ==", title);
    println!("{}", Response::many(docs).to_pretty_json()?);
    Ok(())
}

fn sample_user(i: usize) -> User {
    User {
        account: format!("mongo_{}", i),
        password: format!("pwd_{}", i),
        name: NAMES[i % NAMES.len()].to_string(),
        age: (i as i32) + 1,
        email: format!("{}@qq.com", random_digits()),
        friends: vec![NAMES[(i + 1) % NAMES.len()].to_string()],
        address: Address {
            province: "hunan".into(),
            city: "changsha".into(),
            district: "yuelu".into(),
            remark: String::new(),
        },
        create_at: now(),
        ..Default::default()
    }
}

fn by_account(account: &str) -> Selector {
    Selector::ByFilter(doc! { "account": account })
}

pub async fn create(users: &UserDao) -> Result<()> {
    let batch: Vec<User> = (0..9).map(sample_user).collect();
    let ids = users.create_many(&batch).await?;
    info!(created = ids.len(), collection = users.col_name(), "users created");
    Ok(())
}

pub async fn upsert(users: &UserDao) -> Result<()> {
    let user = User {
        account: "mongo_a".into(),
        password: "pwd_a".into(),
        name: "zhe".into(),
        age: 18,
        email: format!("{}@163.com", random_digits()),
        ..Default::default()
    };
    let result = users.upsert_user(&user).await?;
    println!(
        "upsert mongo_a: updated_existing={} id={:?}",
        result.updated_existing, result.matched_or_upserted_id
    );
    if let Some(stored) = result.returned_document {
        print_docs("upserted user", vec![stored])?;
    }
    Ok(())
}

pub async fn update(users: &UserDao) -> Result<()> {
    let selector = by_account("mongo_0");
    users
        .update(
            selector.clone(),
            doc! { "$set": { "password": "pwd_new", "modify_at": now() }, "$inc": { "age": 10 } },
        )
        .await?;
    users
        .update(
            selector.clone(),
            doc! { "$unset": { "email": "" }, "$rename": { "password": "passwd" } },
        )
        .await?;
    print_docs("updated mongo_0", vec![users.dao().find_one_doc(users.col_name(), selector).await?])
}

pub async fn update_embed(users: &UserDao) -> Result<()> {
    let selector = by_account("mongo_1");
    let address = bson::to_document(&Address {
        province: "guangdong".into(),
        city: "shenzhen".into(),
        district: "nanshan".into(),
        remark: "moved".into(),
    })?;
    users.update(selector.clone(), doc! { "address": address }).await?;
    users
        .update(selector.clone(), doc! { "address.province": "guangxi" })
        .await?;
    let user = users.find_one(selector).await?;
    println!("mongo_1 address: {:?}", user.address);
    Ok(())
}

pub async fn update_array(users: &UserDao) -> Result<()> {
    let selector = by_account("mongo_2");
    users.update(selector.clone(), doc! { "$push": { "friends": "lee" } }).await?;
    users
        .update(
            selector.clone(),
            doc! { "$push": { "friends": { "$each": ["wang", "zhao", "sun"], "$slice": -4 } } },
        )
        .await?;
    println!("after push: {:?}", users.find_one(selector.clone()).await?.friends);

    users.update(selector.clone(), doc! { "$pop": { "friends": -1 } }).await?;
    users.update(selector.clone(), doc! { "$pop": { "friends": 1 } }).await?;
    println!("after pop: {:?}", users.find_one(selector.clone()).await?.friends);

    users
        .update(
            selector.clone(),
            doc! { "$addToSet": { "friends": { "$each": ["wang", "qian"] } } },
        )
        .await?;
    println!("after add to set: {:?}", users.find_one(selector).await?.friends);
    Ok(())
}

pub async fn comment(users: &UserDao) -> Result<()> {
    let author = users.find_by_account("mongo_a").await?;
    let author_id = author.id.context("stored user has no _id")?;
    let at = now();
    let comment = Comment {
        id: ObjectId::new(),
        content: "nice to meet you".into(),
        user_ref: Some(DbRef {
            collection: collection_name(User::NAME),
            id: author_id,
            database: Some(users.dao().name().to_string()),
        }),
        create_at: at.clone(),
        modify_at: at,
        is_delete: false,
        delete_at: String::new(),
    };
    users
        .update(
            by_account("mongo_3"),
            doc! { "$push": { "comments": bson::to_document(&comment)? } },
        )
        .await?;

    let commented = users
        .find_raw(doc! { "comments.user_ref.$id": author_id }, Page::unpaginated(), &[])
        .await?;
    print_docs("commented by mongo_a", commented)
}

pub async fn find(users: &UserDao) -> Result<()> {
    let page = Page::validate("0", "5");
    let docs = users.find_raw(doc! {}, page, &["-age"]).await?;
    print_docs("first page by age desc", docs)?;

    let typed = users
        .find(doc! { "age": { "$gte": 3 } }, Page::unpaginated(), &["+age", "-name"])
        .await?;
    for user in typed {
        println!("{} {} {}", user.account, user.name, user.age);
    }
    println!("total users: {}", users.count(doc! {}).await?);
    Ok(())
}

pub async fn select(dao: &Dao, col_name: &str) -> Result<()> {
    let collection = dao.collection(col_name);
    for projection in [
        doc! { "name": 1, "age": 1 },
        doc! { "name": 0, "age": 0, "address": 0 },
        doc! { "name": 1, "age": 0 },
    ] {
        let mut options = FindOptions::default();
        options.projection = Some(projection.clone());
        options.limit = Some(2);
        match collection.find(doc! {}).with_options(options).await {
            Ok(cursor) => match cursor.try_collect::<Vec<Document>>().await {
                Ok(docs) => print_docs(&format!("projection {}", projection), docs)?,
                Err(err) => warn!(%projection, error = %err, "projection rejected"),
            },
            Err(err) => warn!(%projection, error = %err, "projection rejected"),
        }
    }
    Ok(())
}

pub async fn find_array(users: &UserDao) -> Result<()> {
    let docs = users
        .find_raw(doc! { "friends": { "$all": ["zhe"] } }, Page::unpaginated(), &[])
        .await?;
    print_docs("friends with zhe", docs)?;

    users
        .update(
            Selector::ByFilter(doc! { "comments": { "$elemMatch": { "is_delete": false } } }),
            doc! { "$set": { "comments.$.modify_at": now() } },
        )
        .await
        .or_else(|err| match err {
            DaoError::NotFound => Ok(()),
            other => Err(other),
        })?;
    Ok(())
}

pub async fn fuzzy(users: &UserDao) -> Result<()> {
    let docs = users.fuzzy_search(&["zhe1"], Page::unpaginated()).await?;
    print_docs("fuzzy zhe1", docs)?;
    let docs = users.fuzzy_search(&["qq.com"], Page::new(0, 3)).await?;
    print_docs("fuzzy qq.com", docs)
}

pub async fn pipe(users: &UserDao) -> Result<()> {
    let groups = users.group_by_name(0, 8).await?;
    print_docs("users per name aged 1..7", groups)
}

pub async fn grid_fs(dao: &Dao, upload: Option<&str>) -> Result<()> {
    let id = dao.create_grid_fs("hello.txt", b"hello gridfs").await?;
    let data = dao.find_grid_fs(id).await?;
    println!("gridfs {}: {}", id, String::from_utf8_lossy(&data));

    if let Some(path) = upload {
        let bytes = std::fs::read(path).with_context(|| format!("reading {}", path))?;
        let id = dao.create_grid_fs(path, &bytes).await?;
        let stored = dao.find_grid_fs(id).await?;
        println!("gridfs {}: {} bytes, intact={}", id, stored.len(), stored == bytes);
    }
    Ok(())
}

fn report(case: &str, result: modao::Result<impl std::fmt::Debug>) {
    match result {
        Ok(value) => println!("{}: ok {:?}", case, value),
        Err(err) => println!("{}: error {}", case, err),
    }
}

pub async fn errors(users: &UserDao) -> Result<()> {
    let dao = users.dao();
    let col = users.col_name();

    report(
        "find one by unknown id",
        dao.find_one_doc(col, Selector::ById(ObjectId::new())).await,
    );
    report(
        "find one by id and name",
        dao.find_one_doc(col, Selector::ByFilter(doc! { "_id": ObjectId::new(), "name": "xx" }))
            .await,
    );
    report("find one by name shared by many", dao.find_one_doc(col, by_name("zhe")).await);
    report("bad id text", Selector::parse_id("not-an-id"));
    report("null selector", Selector::from_optional(None));
    report("numeric selector", Selector::from_bson(bson::Bson::Int32(5)));
    report(
        "find unknown name",
        dao.find_doc(col, doc! { "name": "xxx" }, Page::unpaginated(), &[] as &[&str])
            .await
            .map(|docs| docs.len()),
    );
    report(
        "find by string _id",
        dao.find_doc(col, doc! { "_id": "xxx" }, Page::unpaginated(), &[] as &[&str])
            .await
            .map(|docs| docs.len()),
    );
    report(
        "update unknown id",
        dao.update_doc(col, Selector::ById(ObjectId::new()), doc! { "age": 1 }).await,
    );
    report(
        "update with nothing",
        dao.update_doc(col, by_account("mongo_0"), doc! {}).await,
    );
    Ok(())
}

fn by_name(name: &str) -> Selector {
    Selector::ByFilter(doc! { "name": name })
}

pub async fn json(users: &UserDao) -> Result<()> {
    let one = users.dao().find_one_doc(users.col_name(), by_account("mongo_1")).await?;
    println!("{}", Response::one(one).to_json_string()?);
    let all = users.find_raw(doc! {}, Page::new(0, 3), &[]).await?;
    println!("{}", Response::many(all).to_json_string()?);
    Ok(())
}

pub async fn remove(users: &UserDao) -> Result<()> {
    users.remove_by_mark(by_account("mongo_8")).await?;
    report("mark removed twice", users.remove_by_mark(by_account("mongo_8")).await);
    users.remove(by_account("mongo_7")).await?;
    report("removed twice", users.remove(by_account("mongo_7")).await);
    println!(
        "live users: {}",
        users.count(doc! { "is_delete": false }).await?
    );
    Ok(())
}

pub async fn run(users: &UserDao, demo: Demo, upload: Option<&str>) -> Result<()> {
    let dao = users.dao();
    let steps: Vec<Demo> = match demo {
        Demo::All => vec![
            Demo::Create,
            Demo::Upsert,
            Demo::Update,
            Demo::UpdateEmbed,
            Demo::UpdateArray,
            Demo::Comment,
            Demo::Find,
            Demo::Select,
            Demo::FindArray,
            Demo::Fuzzy,
            Demo::Pipe,
            Demo::GridFs,
            Demo::Errors,
            Demo::Json,
            Demo::Remove,
        ],
        one => vec![one],
    };

    for step in steps {
        info!(demo = ?step, "running");
        match step {
            Demo::All => {}
            Demo::Create => create(users).await?,
            Demo::Upsert => upsert(users).await?,
            Demo::Update => update(users).await?,
            Demo::UpdateEmbed => update_embed(users).await?,
            Demo::UpdateArray => update_array(users).await?,
            Demo::Comment => comment(users).await?,
            Demo::Find => find(users).await?,
            Demo::Select => select(dao, users.col_name()).await?,
            Demo::FindArray => find_array(users).await?,
            Demo::Fuzzy => fuzzy(users).await?,
            Demo::Pipe => pipe(users).await?,
            Demo::GridFs => grid_fs(dao, upload).await?,
            Demo::Errors => errors(users).await?,
            Demo::Json => json(users).await?,
            Demo::Remove => remove(users).await?,
        }
    }
    Ok(())
}
