use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::debug;
use uuid::Uuid;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Car {
    #[serde(rename = "_id")]
    pub id: String,
    pub brand: String,
    #[serde(rename = "gasType")]
    pub gas_type: i32,
    pub name: String,
    pub price: f64,
}

/// Body of a save or update. Any `_id` in it is ignored.
#[derive(Deserialize)]
pub struct CarInput {
    #[serde(default)]
    pub brand: String,
    #[serde(rename = "gasType", default)]
    pub gas_type: i32,
    pub name: String,
    #[serde(default)]
    pub price: f64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Brand {
    pub fipe_name: String,
    pub name: String,
    pub key: String,
    pub id: u64,
}

pub type Db = Arc<RwLock<HashMap<String, Car>>>;

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(HashMap::new()));
    Router::new()
        .route("/cars", get(list_cars).post(create_car))
        .route("/cars/", post(create_car))
        .route("/cars/{id}", put(update_car).delete(delete_car))
        .route("/brands", get(list_brands))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

/// The fixed brand list served by `GET /brands`.
pub fn brands() -> Vec<Brand> {
    [(21, "Fiat"), (22, "Ford"), (23, "GM - Chevrolet"), (59, "VW - VolksWagen")]
        .into_iter()
        .map(|(id, name)| Brand {
            fipe_name: name.to_string(),
            name: name.to_uppercase(),
            key: format!("{}-{id}", name.to_lowercase().replace([' ', '-'], "")),
            id,
        })
        .collect()
}

async fn list_cars(State(db): State<Db>) -> Json<Vec<Car>> {
    let cars = db.read().await;
    Json(cars.values().cloned().collect())
}

async fn list_brands() -> Json<Vec<Brand>> {
    Json(brands())
}

async fn create_car(State(db): State<Db>, Json(input): Json<CarInput>) -> Json<Car> {
    let car = Car {
        id: Uuid::new_v4().to_string(),
        brand: input.brand,
        gas_type: input.gas_type,
        name: input.name,
        price: input.price,
    };
    debug!(id = %car.id, "car saved");
    db.write().await.insert(car.id.clone(), car.clone());
    Json(car)
}

async fn update_car(
    State(db): State<Db>,
    Path(id): Path<String>,
    Json(input): Json<CarInput>,
) -> Result<Json<Car>, StatusCode> {
    let mut cars = db.write().await;
    let car = cars.get_mut(&id).ok_or(StatusCode::NOT_FOUND)?;
    car.brand = input.brand;
    car.gas_type = input.gas_type;
    car.name = input.name;
    car.price = input.price;
    Ok(Json(car.clone()))
}

async fn delete_car(
    State(db): State<Db>,
    Path(id): Path<String>,
) -> Result<Json<Car>, StatusCode> {
    let mut cars = db.write().await;
    let car = cars.remove(&id).ok_or(StatusCode::NOT_FOUND)?;
    debug!(id = %id, "car deleted");
    Ok(Json(car))
}
