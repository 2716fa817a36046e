diesel::table! {
    crew (id) {
        id -> Int4,
        first_name -> Text,
        last_name -> Text,
    }
}

diesel::table! {
    stations (id) {
        id -> Int4,
        name -> Text,
        latitude -> Float8,
        longitude -> Float8,
    }
}

diesel::table! {
    train_types (id) {
        id -> Int4,
        name -> Text,
    }
}

diesel::table! {
    trains (id) {
        id -> Int4,
        name -> Text,
        cargo_num -> Int4,
        places_in_cargo -> Int4,
        train_type_id -> Int4,
        image -> Nullable<Text>,
    }
}

diesel::table! {
    routes (id) {
        id -> Int4,
        source_id -> Int4,
        destination_id -> Int4,
        distance -> Int4,
    }
}

diesel::table! {
    journeys (id) {
        id -> Int4,
        route_id -> Int4,
        train_id -> Int4,
        departure_time -> Timestamp,
        arrival_time -> Timestamp,
    }
}

diesel::table! {
    journey_crew (journey_id, crew_id) {
        journey_id -> Int4,
        crew_id -> Int4,
    }
}

diesel::table! {
    orders (id) {
        id -> Int4,
        created_at -> Timestamp,
    }
}

diesel::table! {
    tickets (id) {
        id -> Int4,
        cargo -> Int4,
        seat -> Int4,
        journey_id -> Int4,
        order_id -> Int4,
    }
}

diesel::joinable!(trains -> train_types (train_type_id));
diesel::joinable!(journeys -> routes (route_id));
diesel::joinable!(journeys -> trains (train_id));
diesel::joinable!(journey_crew -> journeys (journey_id));
diesel::joinable!(journey_crew -> crew (crew_id));
diesel::joinable!(tickets -> journeys (journey_id));
diesel::joinable!(tickets -> orders (order_id));

diesel::allow_tables_to_appear_in_same_query!(
    crew,
    stations,
    train_types,
    trains,
    routes,
    journeys,
    journey_crew,
    orders,
    tickets,
);
